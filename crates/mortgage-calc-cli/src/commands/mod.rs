pub mod amortization;
pub mod down_payment;
pub mod mortgage;

/// Today's date, used when no start date is given.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
