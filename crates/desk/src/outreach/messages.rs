//! Refund message templates.

use refund_desk_core::CustomerRecord;

const CLOSING: &str = "Qualquer dúvida, estamos à disposição.";

/// Noun for a number of purchased quotas.
#[must_use]
pub const fn quota_noun(quantity: u32) -> &'static str {
    if quantity == 1 { "cota" } else { "cotas" }
}

/// Compose the refund messages for `customer`, in sending order.
///
/// A purchase with a non-zero discount yields two messages: the refund notice
/// citing the net amount, then the discount explanation. Any other purchase
/// yields a single notice citing the gross amount.
#[must_use]
pub fn build_message(customer: &CustomerRecord) -> Vec<String> {
    let notice = format!(
        "Olá, {name}! Informamos que a sua compra de {quantity} {noun} foi cancelada \
         e o valor de {amount} será reembolsado.",
        name = customer.first_name(),
        quantity = customer.quantity,
        noun = quota_noun(customer.quantity),
        amount = customer.refund_amount(),
    );

    match customer.discount_amount.filter(|_| customer.has_discount()) {
        Some(discount) => vec![
            notice,
            format!(
                "Como a sua compra teve um desconto de {discount}, o reembolso corresponde \
                 ao valor final pago. {CLOSING}"
            ),
        ],
        None => vec![format!("{notice} {CLOSING}")],
    }
}
