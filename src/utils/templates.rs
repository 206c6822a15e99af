//! Order notification email templates.
//!
//! One template per customer-visible delivery status. `pending` has no
//! template: orders enter it at checkout and customers are not emailed.

use crate::domain::{DeliveryStatus, Order};

/// Rendered email content
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

struct StatusCopy {
    subject: &'static str,
    headline: &'static str,
    body: &'static str,
}

fn copy_for(status: DeliveryStatus) -> Option<StatusCopy> {
    match status {
        DeliveryStatus::Pending => None,
        DeliveryStatus::Processing => Some(StatusCopy {
            subject: "We're preparing your order",
            headline: "Your order is being processed",
            body: "We've received your payment and are getting your items ready.",
        }),
        DeliveryStatus::Shipped => Some(StatusCopy {
            subject: "Your order is on its way",
            headline: "Your order has shipped",
            body: "Your package has left our warehouse and is heading to you.",
        }),
        DeliveryStatus::Delivered => Some(StatusCopy {
            subject: "Your order has been delivered",
            headline: "Delivered",
            body: "Your order has arrived. We hope you love it!",
        }),
        DeliveryStatus::Cancelled => Some(StatusCopy {
            subject: "Your order has been cancelled",
            headline: "Order cancelled",
            body: "Your order was cancelled. If you were charged, a refund is on its way.",
        }),
    }
}

/// Render the notification for `status`, or `None` if that status is silent.
pub fn order_status_email(
    order: &Order,
    status: DeliveryStatus,
    store_url: &str,
) -> Option<RenderedEmail> {
    let copy = copy_for(status)?;
    let reference = short_reference(order);
    let order_url = format!("{}/orders/{}", store_url.trim_end_matches('/'), order.id);
    let name = order.recipient_name();

    let item_lines: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "- {} x{} ({:.2} {})",
                item.name,
                item.quantity,
                item.subtotal(),
                order.currency
            )
        })
        .collect();

    let text = format!(
        "Hi {name},\n\n\
         {body}\n\n\
         Order #{reference}\n\
         {items}\n\
         Total: {total:.2} {currency}\n\n\
         Track your order: {order_url}\n",
        name = name,
        body = copy.body,
        reference = reference,
        items = item_lines.join("\n"),
        total = order.total_amount,
        currency = order.currency,
        order_url = order_url,
    );

    let item_rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2} {}</td></tr>",
                escape_html(&item.name),
                item.quantity,
                item.subtotal(),
                escape_html(&order.currency)
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; color: #222;">
  <h2>{headline}</h2>
  <p>Hi {name},</p>
  <p>{body}</p>
  <p><strong>Order #{reference}</strong></p>
  <table cellpadding="4">{rows}</table>
  <p>Total: <strong>{total:.2} {currency}</strong></p>
  <p><a href="{order_url}">Track your order</a></p>
</body>
</html>
"#,
        headline = copy.headline,
        name = escape_html(name),
        body = copy.body,
        reference = reference,
        rows = item_rows,
        total = order.total_amount,
        currency = escape_html(&order.currency),
        order_url = escape_html(&order_url),
    );

    Some(RenderedEmail {
        subject: format!("{} (#{})", copy.subject, reference),
        text,
        html,
    })
}

/// First block of the order id, upper-cased
fn short_reference(order: &Order) -> String {
    order
        .id
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, PaymentInfo, PaymentStatus, ShippingInfo};
    use chrono::Utc;
    use uuid::Uuid;

    fn order() -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: vec![LineItem {
                product_id: Uuid::new_v4(),
                name: "Tee <limited>".to_string(),
                quantity: 1,
                unit_price: 15.0,
                color: None,
            }],
            total_amount: 15.0,
            currency: "NGN".to_string(),
            shipping_info: Some(ShippingInfo {
                full_name: "Ada".to_string(),
                phone: "0800".to_string(),
                email: Some("ada@example.com".to_string()),
                region: "Lagos".to_string(),
                street: "1 Road".to_string(),
                postal_code: None,
                notes: None,
            }),
            payment: PaymentInfo {
                method: "paystack".to_string(),
                status: PaymentStatus::Paid,
                reference: Some("ref".to_string()),
            },
            delivery_status: DeliveryStatus::Processing,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_has_no_template() {
        assert!(order_status_email(&order(), DeliveryStatus::Pending, "https://shop.test").is_none());
    }

    #[test]
    fn test_template_exists_exactly_for_notifying_statuses() {
        for status in DeliveryStatus::ALL {
            assert_eq!(
                order_status_email(&order(), status, "https://shop.test").is_some(),
                status.notifies_customer(),
                "{}",
                status
            );
        }
    }

    #[test]
    fn test_every_other_status_renders() {
        for status in DeliveryStatus::ALL
            .into_iter()
            .filter(|s| s.notifies_customer())
        {
            let email = order_status_email(&order(), status, "https://shop.test").unwrap();
            assert!(!email.subject.is_empty());
            assert!(email.text.contains("Hi Ada"));
        }
    }

    #[test]
    fn test_shipped_email_links_to_order() {
        let order = order();
        let email = order_status_email(&order, DeliveryStatus::Shipped, "https://shop.test/").unwrap();
        assert!(email.subject.starts_with("Your order is on its way"));
        assert!(email
            .text
            .contains(&format!("https://shop.test/orders/{}", order.id)));
    }

    #[test]
    fn test_html_escapes_item_names() {
        let email = order_status_email(&order(), DeliveryStatus::Delivered, "https://shop.test").unwrap();
        assert!(email.html.contains("Tee &lt;limited&gt;"));
        assert!(!email.html.contains("<limited>"));
    }
}
