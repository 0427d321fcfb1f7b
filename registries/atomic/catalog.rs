/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::Deserialize;

use crate::services::search;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    pub code: String,
    pub display_name: String,
}

impl CatalogItem {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    /// Text the fuzzy matcher runs against: `"{code} {display_name}"`.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.code, self.display_name)
    }
}

const AWS_REGIONS: [(&str, &str); 32] = [
    ("us-east-1", "US East (N. Virginia)"),
    ("us-east-2", "US East (Ohio)"),
    ("us-west-1", "US West (N. California)"),
    ("us-west-2", "US West (Oregon)"),
    ("af-south-1", "Africa (Cape Town)"),
    ("ap-east-1", "Asia Pacific (Hong Kong)"),
    ("ap-south-2", "Asia Pacific (Hyderabad)"),
    ("ap-southeast-3", "Asia Pacific (Jakarta)"),
    ("ap-southeast-5", "Asia Pacific (Malaysia)"),
    ("ap-southeast-4", "Asia Pacific (Melbourne)"),
    ("ap-south-1", "Asia Pacific (Mumbai)"),
    ("ap-northeast-3", "Asia Pacific (Osaka)"),
    ("ap-northeast-2", "Asia Pacific (Seoul)"),
    ("ap-southeast-1", "Asia Pacific (Singapore)"),
    ("ap-southeast-2", "Asia Pacific (Sydney)"),
    ("ap-southeast-7", "Asia Pacific (Thailand)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
    ("ca-central-1", "Canada (Central)"),
    ("ca-west-1", "Canada West (Calgary)"),
    ("eu-central-1", "Europe (Frankfurt)"),
    ("eu-west-1", "Europe (Ireland)"),
    ("eu-west-2", "Europe (London)"),
    ("eu-south-1", "Europe (Milan)"),
    ("eu-west-3", "Europe (Paris)"),
    ("eu-south-2", "Europe (Spain)"),
    ("eu-north-1", "Europe (Stockholm)"),
    ("eu-central-2", "Europe (Zurich)"),
    ("il-central-1", "Israel (Tel Aviv)"),
    ("mx-central-1", "Mexico (Central)"),
    ("me-south-1", "Middle East (Bahrain)"),
    ("me-central-1", "Middle East (UAE)"),
    ("sa-east-1", "South America (São Paulo)"),
];

/// Ordered, fixed set of pickable regions. Codes are assumed unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCatalog {
    items: Vec<CatalogItem>,
}

impl RegionCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.code == code)
    }

    /// Replace the entry with the same code in place, or append.
    pub fn upsert(&mut self, item: CatalogItem) {
        match self.items.iter_mut().find(|existing| existing.code == item.code) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Entries matching `query`, in catalog order.
    pub fn filter(&self, query: &str) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| search::matches(query, &item.search_text()))
            .cloned()
            .collect()
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::new(
            AWS_REGIONS
                .iter()
                .map(|(code, display_name)| CatalogItem::new(*code, *display_name))
                .collect(),
        )
    }
}
