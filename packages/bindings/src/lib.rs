//! Node bindings for the mortgage calculator. Every function takes the input
//! as a JSON string and returns the computation envelope as a JSON string, so
//! the web form can hand its fields straight to the core on each change.

use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Down payment
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_down_payment(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::down_payment::calculator::DownPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::down_payment::calculator::compute_down_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::amortization::schedule::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::amortization::schedule::compute_amortization(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Combined analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_mortgage(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::mortgage::analysis::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::mortgage::analysis::analyze_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
