use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, error, info};

use crate::entities::order::Status;
use crate::entities::{contact_message, order, order_item, product, telegram_config};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Fire-and-forget Telegram side channel.
///
/// Every method swallows its own failures: missing or inactive configuration,
/// network errors and API rejections are logged and reported as `false`, never
/// surfaced to the calling operation. At-most-once, no retries, no queue.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new() -> Self {
        Self::with_api_base(TELEGRAM_API_BASE)
    }

    /// Same notifier against a different endpoint; used by tests.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        TelegramNotifier {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            api_base: api_base.into(),
        }
    }

    /// Reads the configuration row per send so credential edits in the admin
    /// panel apply immediately.
    async fn active_config(&self, db: &DatabaseConnection) -> Option<telegram_config::Model> {
        let config = match telegram_config::Entity::find()
            .filter(telegram_config::Column::IsActive.eq(true))
            .one(db)
            .await
        {
            Ok(config) => config?,
            Err(err) => {
                error!(error = %err, "Failed to load telegram configuration");
                return None;
            }
        };
        if config.bot_token.trim().is_empty() {
            debug!("Telegram bot token is not set");
            return None;
        }
        if config.chat_id.trim().is_empty() {
            debug!("Telegram chat id is not set");
            return None;
        }
        Some(config)
    }

    async fn send_message(&self, config: &telegram_config::Model, text: &str) -> bool {
        let url = format!("{}/bot{}/sendMessage", self.api_base, config.bot_token);
        let body = json!({
            "chat_id": config.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Telegram message delivered");
                true
            }
            Ok(response) => {
                error!(status = %response.status(), "Telegram API rejected the message");
                false
            }
            Err(err) => {
                error!(error = %err, "Failed to reach the Telegram API");
                false
            }
        }
    }

    pub async fn notify_new_order(
        &self,
        db: &DatabaseConnection,
        order: &order::Model,
        items: &[order_item::Model],
    ) -> bool {
        let Some(config) = self.active_config(db).await else {
            return false;
        };
        if !config.notify_new_orders {
            debug!("New order notifications are disabled");
            return false;
        }

        let names = self.product_names(db, items).await;

        let mut message = format!(
            "🛒 <b>NEW ORDER #{}</b>\n\n\
             👤 <b>Customer:</b>\n\
             • Name: {} {}\n\
             • Phone: {}\n\n\
             📍 <b>Delivery address:</b>\n\
             • City: {}\n\
             • Address: {}\n",
            order.id,
            escape_html(&order.first_name),
            escape_html(&order.last_name),
            escape_html(&order.phone),
            escape_html(&order.city),
            escape_html(&order.address),
        );
        if !order.postal_code.is_empty() {
            let _ = writeln!(message, "• Postal code: {}", escape_html(&order.postal_code));
        }

        message.push_str("\n📦 <b>Items:</b>\n");
        for item in items {
            let fallback = format!("Product #{}", item.product_id);
            let name = names.get(&item.product_id).unwrap_or(&fallback);
            let _ = writeln!(message, "• {} x{}", escape_html(name), item.quantity);
            if !item.size.is_empty() {
                let _ = writeln!(message, "  Size: {}", escape_html(&item.size));
            }
            if !item.color.is_empty() {
                let _ = writeln!(message, "  Color: {}", escape_html(&item.color));
            }
            let _ = writeln!(message, "  Price: {:.2}", item.price);
        }

        let _ = write!(message, "\n💰 <b>Total: {:.2}</b>", order.total);
        if !order.notes.is_empty() {
            let _ = write!(
                message,
                "\n\n📝 <b>Notes:</b>\n{}",
                escape_html(&order.notes)
            );
        }
        let _ = write!(message, "\n\n⏰ {}", order.created_at.format("%d.%m.%Y %H:%M"));

        self.send_message(&config, &message).await
    }

    pub async fn notify_status_change(
        &self,
        db: &DatabaseConnection,
        order: &order::Model,
        old_status: Status,
    ) -> bool {
        let Some(config) = self.active_config(db).await else {
            return false;
        };
        if !config.notify_status_changes {
            debug!("Status change notifications are disabled");
            return false;
        }

        let emoji = match order.status {
            Status::Pending => "⏳",
            Status::Processing => "🔄",
            Status::Shipped => "📦",
            Status::Delivered => "✅",
            Status::Cancelled => "❌",
        };

        let mut message = format!(
            "{} <b>ORDER #{} STATUS CHANGE</b>\n\n\
             👤 <b>Customer:</b> {} {}\n\
             📞 <b>Phone:</b> {}\n\n\
             <b>Status:</b> {}\n",
            emoji,
            order.id,
            escape_html(&order.first_name),
            escape_html(&order.last_name),
            escape_html(&order.phone),
            order.status.display(),
        );
        if old_status != order.status {
            let _ = writeln!(message, "<b>Previous status:</b> {}", old_status.display());
        }
        let _ = write!(message, "\n💰 <b>Amount:</b> {:.2}", order.total);
        let _ = write!(message, "\n⏰ {}", order.updated_at.format("%d.%m.%Y %H:%M"));

        self.send_message(&config, &message).await
    }

    pub async fn notify_contact_message(
        &self,
        db: &DatabaseConnection,
        contact: &contact_message::Model,
    ) -> bool {
        let Some(config) = self.active_config(db).await else {
            return false;
        };
        if !config.notify_contact_messages {
            debug!("Contact form notifications are disabled");
            return false;
        }

        let phone = if contact.phone.is_empty() {
            "Not provided".to_owned()
        } else {
            escape_html(&contact.phone)
        };
        let message = format!(
            "📧 <b>NEW CONTACT FORM MESSAGE</b>\n\n\
             👤 <b>From:</b> {}\n\
             📧 <b>Email:</b> {}\n\
             📞 <b>Phone:</b> {}\n\n\
             📋 <b>Subject:</b> {}\n\n\
             💬 <b>Message:</b>\n{}\n\n\
             ⏰ {}",
            escape_html(&contact.name),
            escape_html(&contact.email),
            phone,
            escape_html(&contact.subject),
            escape_html(&contact.message),
            contact.created_at.format("%d.%m.%Y %H:%M"),
        );

        self.send_message(&config, &message).await
    }

    async fn product_names(
        &self,
        db: &DatabaseConnection,
        items: &[order_item::Model],
    ) -> HashMap<i32, String> {
        let ids: Vec<i32> = items.iter().map(|item| item.product_id).collect();
        match product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(db)
            .await
        {
            Ok(products) => products
                .into_iter()
                .map(|product| (product.id, product.name))
                .collect(),
            Err(err) => {
                error!(error = %err, "Failed to load product names for the notification");
                HashMap::new()
            }
        }
    }
}

impl Default for TelegramNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
