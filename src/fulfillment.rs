//! Fulfillment record builder.
//!
//! Pure, deterministic transformation of (pending order, fetched payment,
//! instant) into the record appended to the management spreadsheet. Every
//! derived artifact here must be byte-for-byte reproducible from the same
//! inputs; the tests pin that down.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::America::Santiago;

use crate::models::{FulfillmentRecord, Identification, PaymentRecord, PendingOrder};

/// Initial management status of every new record.
pub const STATUS_PENDING: &str = "Pendiente";

/// Sentinel when the payment carries no identification document.
pub const ID_NOT_INFORMED: &str = "No informado";

/// Days granted to complete the management work, counted from the request date.
const DEADLINE_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%d-%m-%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Textual prefix of derived referral codes.
const REFERRAL_PREFIX: &str = "REF-";
/// How many leading reference characters feed the code.
const REFERRAL_LEN: usize = 8;

/// Split an instant into date and time strings in the operating region's
/// local time. All records use this one zone regardless of caller locale.
pub fn split_timestamp(at: DateTime<Utc>) -> (String, String) {
    let local = at.with_timezone(&Santiago);
    (
        local.format(DATE_FORMAT).to_string(),
        local.format(TIME_FORMAT).to_string(),
    )
}

/// Referral code for the new customer: fixed prefix plus the first eight
/// characters of the order reference, uppercased. Same reference, same code.
pub fn referral_code(reference: &str) -> String {
    let head: String = reference.chars().take(REFERRAL_LEN).collect();
    format!("{}{}", REFERRAL_PREFIX, head.to_uppercase())
}

/// Render the payer's identification document, or the fixed sentinel.
pub fn render_identification(identification: Option<&Identification>) -> String {
    match identification {
        Some(id) => format!("{}: {}", id.id_type, id.number),
        None => ID_NOT_INFORMED.to_string(),
    }
}

/// Management deadline: request date plus [`DEADLINE_DAYS`], same zone and
/// format as the request date.
pub fn deadline(at: DateTime<Utc>) -> String {
    (at.with_timezone(&Santiago) + Duration::days(DEADLINE_DAYS))
        .format(DATE_FORMAT)
        .to_string()
}

/// Progress/alert cell for the spreadsheet. References the deadline cell one
/// column to the left so it is row-position independent. Opaque text to us;
/// the spreadsheet evaluates it.
pub fn progress_formula() -> String {
    r#"=SI(HOY()>INDIRECTO("RC[-1]"; FALSO); "VENCIDO"; "VIGENTE")"#.to_string()
}

/// The legal attestation embedded in the record and served by the backup
/// endpoint. Fixed template; byte-for-byte reproducible.
pub fn attestation_text(
    reference: &str,
    date: &str,
    time: &str,
    payer_name: &str,
    identification: &str,
    plan_name: &str,
) -> String {
    format!(
        "Comprobante de contratación N° {reference}\n\
         \n\
         Fecha: {date}\n\
         Hora: {time}\n\
         Titular: {payer_name}\n\
         Identificación: {identification}\n\
         Plan contratado: {plan_name}\n\
         \n\
         El titular autoriza expresamente a Resguardo a gestionar, en su \
         nombre y representación, la protección de los datos de contacto \
         entregados al contratar el plan indicado, conforme a la Ley N° \
         19.628 sobre protección de la vida privada."
    )
}

/// Intake-submitted names win; gateway payer fields are the fallback when
/// the submitted value is empty.
fn resolve_name(submitted: &str, fetched: Option<&str>) -> String {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        fetched.unwrap_or_default().trim().to_string()
    } else {
        submitted.to_string()
    }
}

/// Build the fulfillment record. Pure given its inputs; the caller supplies
/// the already-encrypted contact payload and the fulfillment instant.
pub fn build_record(
    reference: &str,
    pending: &PendingOrder,
    payment: &PaymentRecord,
    encrypted_contacts: String,
    at: DateTime<Utc>,
) -> FulfillmentRecord {
    let (request_date, request_time) = split_timestamp(at);

    let first_name = resolve_name(&pending.payer_first_name, payment.payer.first_name.as_deref());
    let last_name = resolve_name(&pending.payer_last_name, payment.payer.last_name.as_deref());

    let plan_name = payment
        .description
        .as_deref()
        .unwrap_or("Plan")
        .to_string();

    let identification = render_identification(payment.payer.identification.as_ref());

    let payer_name = format!("{} {}", first_name, last_name);
    let attestation = attestation_text(
        reference,
        &request_date,
        &request_time,
        payer_name.trim(),
        &identification,
        &plan_name,
    );

    FulfillmentRecord {
        reference: reference.to_string(),
        request_date,
        request_time,
        payer_first_name: first_name,
        payer_last_name: last_name,
        plan_name,
        encrypted_contacts,
        management_status: STATUS_PENDING.to_string(),
        deadline: deadline(at),
        progress_formula: progress_formula(),
        payment_id: payment.id.clone(),
        attestation,
        referral_code: referral_code(reference),
        referred_by: pending.referred_by.clone(),
    }
}
