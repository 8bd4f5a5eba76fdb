use super::*;

/// Something users can spend coins on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopItem {
    /// Name typed after `buy`, matched case-insensitively.
    pub key: String,
    pub label: String,
    pub price: u64,
}

impl ShopItem {
    pub fn new(key: &str, label: &str, price: u64) -> Self {
        Self {
            key: key.to_lowercase(),
            label: label.to_string(),
            price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceList {
    items: Vec<ShopItem>,
}

impl PriceList {
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    pub fn find(&self, key: &str) -> Option<&ShopItem> {
        let key = key.to_lowercase();
        self.items.iter().find(|item| item.key == key)
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }
}

impl Default for PriceList {
    fn default() -> Self {
        Self::new(vec![
            ShopItem::new("vip", "VIP", 100),
            ShopItem::new("custom", "Custom", 200),
        ])
    }
}

pub async fn shop(_invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let listing = bot
        .shop()
        .items()
        .iter()
        .map(|item| format!("{} {} coins", item.label, item.price))
        .collect::<Vec<_>>()
        .join(" | ");
    let keys = bot
        .shop()
        .items()
        .iter()
        .map(|item| item.key.as_str())
        .collect::<Vec<_>>()
        .join(" / ");

    Ok(Some(format!(
        "🛒 Shop: {listing}\nUse {}buy {keys}",
        bot.settings().prefix
    )))
}

/// Spend coins on a shop item. Unknown or missing items are ignored.
pub async fn buy(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let Some(item) = invocation
        .args
        .first()
        .and_then(|key| bot.shop().find(key))
    else {
        return Ok(None);
    };

    let remaining = bot.counters().debit(invocation.message.author, item.price)?;
    tracing::info!(
        "User {} bought {} for {} coins, {} left",
        invocation.message.author,
        item.key,
        item.price,
        remaining.currency
    );

    Ok(Some(format!("✅ {} bought", item.label)))
}
