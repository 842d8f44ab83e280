use crate::core::phone::PhoneValidator;
use crate::domain::model::{Order, SummaryRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 統計訂單：無客戶、無電話、零金額、重複及無效電話
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryEngine {
    validator: PhoneValidator,
}

impl SummaryEngine {
    pub fn new() -> Self {
        Self {
            validator: PhoneValidator::new(),
        }
    }

    pub fn summarize(&self, orders: &[Order]) -> SummaryRecord {
        let mut phones: Vec<&str> = Vec::new();
        let mut invalid: Vec<&str> = Vec::new();
        let mut no_client = 0;
        let mut no_phone = 0;
        let mut zero_sum = 0;

        for order in orders {
            if !order.has_customer() {
                no_client += 1;
                continue;
            }
            let Some(phone) = order.phone() else {
                no_phone += 1;
                continue;
            };

            phones.push(phone);
            if !self.validator.is_valid(phone) {
                invalid.push(phone);
            }
            // zero-sum is only tracked for orders that reached phone analysis
            if order.is_zero_sum() {
                zero_sum += 1;
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &phone in &phones {
            *counts.entry(phone).or_insert(0) += 1;
        }

        let duplicates: BTreeMap<String, usize> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(phone, count)| (phone.to_string(), *count))
            .collect();

        let distinct_invalid: BTreeSet<&str> = invalid.iter().copied().collect();

        SummaryRecord {
            total: orders.len(),
            no_client,
            no_phone,
            zero_sum,
            unique_phone_count: counts.len(),
            invalid: distinct_invalid.into_iter().map(str::to_string).collect(),
            invalid_count: invalid.len(),
            duplicates,
        }
    }
}

pub fn summarize(orders: &[Order]) -> SummaryRecord {
    SummaryEngine::new().summarize(orders)
}
