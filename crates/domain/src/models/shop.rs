//! Multi-shop scoping: shops, shop groups and the admin shop context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A storefront known to the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i32,
    pub group_id: i32,
    pub name: String,
    /// Base URL ending with a slash, e.g. `https://shop.example.com/`.
    pub base_url: String,
}

/// Scope an admin request operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopContext {
    Shop(i32),
    Group(i32),
    All,
}

impl ShopContext {
    /// Parses the `shop_context` query parameter (`s-<id>`, `g-<id>` or `all`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(ShopContext::All);
        }
        let (kind, id) = value.split_once('-')?;
        let id: i32 = id.parse().ok()?;
        match kind {
            "s" => Some(ShopContext::Shop(id)),
            "g" => Some(ShopContext::Group(id)),
            _ => None,
        }
    }

    /// Query parameter form, inverse of [`ShopContext::parse`].
    pub fn as_param(&self) -> String {
        match self {
            ShopContext::Shop(id) => format!("s-{}", id),
            ShopContext::Group(id) => format!("g-{}", id),
            ShopContext::All => "all".to_string(),
        }
    }

    /// Slides can only be managed from a single-shop context.
    pub fn is_single_shop(&self) -> bool {
        matches!(self, ShopContext::Shop(_))
    }

    pub fn shop_id(&self) -> Option<i32> {
        match self {
            ShopContext::Shop(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ShopContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

/// Read-only view over the host's shop list.
#[derive(Debug, Clone, Default)]
pub struct ShopDirectory {
    shops: Vec<Shop>,
}

impl ShopDirectory {
    pub fn new(shops: Vec<Shop>) -> Self {
        Self { shops }
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn get(&self, shop_id: i32) -> Option<&Shop> {
        self.shops.iter().find(|s| s.id == shop_id)
    }

    pub fn group_of(&self, shop_id: i32) -> Option<i32> {
        self.get(shop_id).map(|s| s.group_id)
    }

    /// Shop ids covered by a context, in directory order.
    pub fn context_shop_ids(&self, context: ShopContext) -> Vec<i32> {
        match context {
            ShopContext::Shop(id) => self.get(id).map(|s| vec![s.id]).unwrap_or_default(),
            ShopContext::Group(group_id) => self
                .shops
                .iter()
                .filter(|s| s.group_id == group_id)
                .map(|s| s.id)
                .collect(),
            ShopContext::All => self.shops.iter().map(|s| s.id).collect(),
        }
    }

    /// Distinct group ids of the given shops, in first-seen order.
    pub fn groups_of(&self, shop_ids: &[i32]) -> Vec<i32> {
        let mut groups = Vec::new();
        for shop_id in shop_ids {
            if let Some(group_id) = self.group_of(*shop_id) {
                if !groups.contains(&group_id) {
                    groups.push(group_id);
                }
            }
        }
        groups
    }

    /// Group id used to read settings for a context (`None` for all shops).
    pub fn context_group_id(&self, context: ShopContext) -> Option<i32> {
        match context {
            ShopContext::Shop(id) => self.group_of(id),
            ShopContext::Group(group_id) => Some(group_id),
            ShopContext::All => None,
        }
    }

    /// Whether a context refers to something that exists in the directory.
    pub fn is_known(&self, context: ShopContext) -> bool {
        match context {
            ShopContext::Shop(id) => self.get(id).is_some(),
            ShopContext::Group(group_id) => self.shops.iter().any(|s| s.group_id == group_id),
            ShopContext::All => true,
        }
    }

    pub fn names_of(&self, shop_ids: &[i32]) -> Vec<String> {
        shop_ids
            .iter()
            .filter_map(|id| self.get(*id).map(|s| s.name.clone()))
            .collect()
    }
}
