// WhatsApp order hand-off
//
// Composes the free-text order summary and the wa.me deep link the
// storefront opens after checkout. Output-only; nothing is sent from
// the server.

use serde::Serialize;

use crate::orders::models::{Order, OrderItem, OrderType};

/// Message plus deep link for one order
#[derive(Debug, Serialize)]
pub struct WhatsAppHandoff {
    pub message: String,
    pub url: String,
}

/// Compose the order summary message
///
/// One line per item with its line total, then the totals block. Values
/// are formatted with two decimal places in BRL.
pub fn order_message(order: &Order, items: &[OrderItem]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(items.len() + 4);

    lines.push("🍕 *Novo Pedido*".to_string());
    lines.push(String::new());

    for item in items {
        lines.push(format!(
            "- {}x {} (R$ {:.2})",
            item.quantity, item.product_name, item.subtotal
        ));
    }

    lines.push(String::new());
    if order.discount > rust_decimal::Decimal::ZERO {
        lines.push(format!("Desconto: R$ {:.2}", order.discount));
    }
    if order.order_type == OrderType::Delivery {
        lines.push(format!("Entrega: R$ {:.2}", order.delivery_fee));
    }
    lines.push(format!("*Total: R$ {:.2}*", order.total_amount));

    lines.join("\n")
}

/// Build the wa.me deep link for a message
pub fn order_link(phone_number: &str, message: &str) -> String {
    format!("https://wa.me/{}?text={}", phone_number, url_encode(message))
}

/// Percent-encode a message for use in a URL query value
fn url_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len() * 3);

    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(order_type: OrderType) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: None,
            customer_name: "Maria".to_string(),
            customer_phone: "11999990000".to_string(),
            customer_address: "Rua A, 10".to_string(),
            status: OrderStatus::Pending,
            order_type,
            delivery_zone_id: None,
            subtotal: dec!(37.00),
            discount: dec!(3.70),
            delivery_fee: dec!(5.00),
            total_amount: dec!(38.30),
            payment_method: None,
            change_for: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(name: &str, quantity: i32, subtotal: rust_decimal::Decimal) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: Uuid::new_v4(),
            product_id: Some(1),
            product_name: name.to_string(),
            quantity,
            unit_price: subtotal / rust_decimal::Decimal::from(quantity),
            subtotal,
        }
    }

    #[test]
    fn test_message_lists_items_and_totals() {
        let order = order(OrderType::Delivery);
        let items = vec![
            item("Calabresa (Média)", 1, dec!(35.00)),
            item("Refrigerante", 1, dec!(2.00)),
        ];

        let message = order_message(&order, &items);

        assert!(message.starts_with("🍕 *Novo Pedido*"));
        assert!(message.contains("- 1x Calabresa (Média) (R$ 35.00)"));
        assert!(message.contains("- 1x Refrigerante (R$ 2.00)"));
        assert!(message.contains("Desconto: R$ 3.70"));
        assert!(message.contains("Entrega: R$ 5.00"));
        assert!(message.contains("*Total: R$ 38.30*"));
    }

    #[test]
    fn test_pickup_message_omits_delivery_line() {
        let mut order = order(OrderType::Pickup);
        order.delivery_fee = rust_decimal::Decimal::ZERO;
        order.discount = rust_decimal::Decimal::ZERO;
        order.total_amount = dec!(37.00);

        let message = order_message(&order, &[item("Calabresa", 1, dec!(37.00))]);

        assert!(!message.contains("Entrega:"));
        assert!(!message.contains("Desconto:"));
        assert!(message.contains("*Total: R$ 37.00*"));
    }

    #[test]
    fn test_link_encodes_message() {
        let url = order_link("5511999999999", "Total: R$ 10.00");

        assert!(url.starts_with("https://wa.me/5511999999999?text="));
        assert!(url.contains("Total%3A%20R%24%2010.00"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_url_encode_keeps_unreserved_characters() {
        assert_eq!(url_encode("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
        assert_eq!(url_encode("a b"), "a%20b");
        assert_eq!(url_encode("100%"), "100%25");
    }
}
