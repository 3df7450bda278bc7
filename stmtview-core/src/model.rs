//! Documents returned by the statement analysis service.
//!
//! Field names follow the service's JSON. Values are kept exactly as
//! received: amounts stay currency-formatted strings and keyed maps keep
//! their document order.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A single statement line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Currency-formatted, e.g. "$1,200.50"
    #[serde(default)]
    pub amount: String,
    /// Credit/Debit as labelled by the service
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatementPeriod {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Parsed bank statement.
///
/// `transactions` is the only required field; a body without it (an error
/// payload, a "not found" placeholder) is not a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default)]
    pub statement_period: StatementPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub opening_balance: String,
    #[serde(default)]
    pub closing_balance: String,
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub recurring_transactions: Vec<String>,
    #[serde(default)]
    pub top_categories: CategoryCounts,
}

/// Computed statistics for a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Net cash flow per period label
    #[serde(rename = "NCF", default)]
    pub net_cash_flow: PeriodSeries,
    /// Expense/income ratio (percent) per period label
    #[serde(default)]
    pub expense_income_ratio: PeriodSeries,
    /// Number of overdraft occurrences, not a currency ceiling
    #[serde(rename = "overdraft_limit")]
    pub overdraft_count: u64,
    /// Income stability, percent
    pub income_stability: f64,
}

/// Result of one successful round trip. Statement and statistics only ever
/// exist together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub statement: BankStatement,
    pub statistics: Statistics,
}

pub type CategoryCounts = OrderedMap<u64>;
pub type PeriodSeries = OrderedMap<f64>;

/// String-keyed map that keeps insertion (document) order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Values accepted inside an [`OrderedMap`] document.
///
/// The service emits numbers, but hand-written or model-generated documents
/// sometimes quote them.
pub trait MapValue: Sized {
    fn from_json(value: &serde_json::Value) -> Option<Self>;

    /// Value for a bare label when the map arrives in list form.
    fn bare_label() -> Option<Self> {
        None
    }
}

impl MapValue for u64 {
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn bare_label() -> Option<Self> {
        Some(1)
    }
}

impl MapValue for f64 {
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: MapValue> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of labels to numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = OrderedMap::new();
        while let Some((key, raw)) = access.next_entry::<String, serde_json::Value>()? {
            let value = V::from_json(&raw)
                .ok_or_else(|| de::Error::custom(format!("non-numeric value for '{key}': {raw}")))?;
            out.insert(key, value);
        }
        Ok(out)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        if V::bare_label().is_none() {
            return Err(de::Error::invalid_type(de::Unexpected::Seq, &self));
        }
        let mut out = OrderedMap::new();
        while let Some(label) = access.next_element::<String>()? {
            if let Some(value) = V::bare_label() {
                out.insert(label, value);
            }
        }
        Ok(out)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::new())
    }
}

impl<'de, V: MapValue> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}
