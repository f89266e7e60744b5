//! Deposit payment QR links.
//!
//! Builds a VietQR image link carrying the deposit amount and a memo
//! that references the appointment, so the tenant's banking app can
//! pre-fill the transfer.

use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

use super::{Appointment, BookingType};
use crate::error::RentalError;

const VIETQR_BASE: &str = "https://img.vietqr.io/image";
const VIETQR_TEMPLATE: &str = "compact2";

/// Receiving bank account for deposits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAccount {
    /// Bank short code (e.g. `"MB"`).
    pub bank_id: String,
    /// Account number.
    pub account_no: String,
    /// Account holder name as printed by the bank.
    pub account_name: String,
    /// Memo prefix placed before the appointment reference.
    pub memo_prefix: String,
}

/// Everything the payment screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepositQr {
    /// QR image link.
    pub image_url: String,
    /// Amount encoded in the QR.
    pub amount: u64,
    /// Transfer memo encoded in the QR.
    pub memo: String,
    /// Bank short code.
    pub bank_id: String,
    /// Account number.
    pub account_no: String,
    /// Account holder name.
    pub account_name: String,
}

/// Builds the payment QR for a deposit appointment.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] for `VIEW` bookings, closed
/// appointments, or a record without a deposit amount, and
/// [`RentalError::Internal`] if the configured account yields an
/// unparseable link.
pub fn deposit_qr(account: &PaymentAccount, appointment: &Appointment) -> Result<DepositQr, RentalError> {
    if appointment.booking_type != BookingType::Deposit {
        return Err(RentalError::Validation(
            "payment QR is only available for deposit bookings".to_string(),
        ));
    }
    if appointment.status.is_terminal() {
        return Err(RentalError::Validation(format!(
            "appointment {} is {}; no payment is due",
            appointment.id, appointment.status
        )));
    }
    let amount = appointment.deposit_amount.ok_or_else(|| {
        RentalError::Validation("appointment has no deposit amount".to_string())
    })?;

    let memo = format!("{} {}", account.memo_prefix, appointment.id.short_ref())
        .trim()
        .to_string();

    let mut url = Url::parse(&format!(
        "{VIETQR_BASE}/{}-{}-{VIETQR_TEMPLATE}.jpg",
        account.bank_id, account.account_no
    ))
    .map_err(|e| RentalError::Internal(format!("invalid payment account: {e}")))?;
    url.query_pairs_mut()
        .append_pair("amount", &amount.to_string())
        .append_pair("addInfo", &memo)
        .append_pair("accountName", &account.account_name);

    Ok(DepositQr {
        image_url: url.into(),
        amount,
        memo,
        bank_id: account.bank_id.clone(),
        account_no: account.account_no.clone(),
        account_name: account.account_name.clone(),
    })
}
