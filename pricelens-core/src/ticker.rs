//! Ticker resolution: comma-separated input → ordered symbol/display-name map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in display names. Unknown symbols display as themselves.
const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("GOOGL", "Google"),
    ("META", "Facebook"),
    ("AMZN", "Amazon"),
    ("NFLX", "Netflix"),
    ("TSLA", "Tesla"),
    ("TM", "TOYOTA"),
];

/// Immutable symbol → display-name lookup, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    names: BTreeMap<String, String>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NameTable {
    pub fn builtin() -> Self {
        Self::with_overrides(BTreeMap::new())
    }

    /// Built-in table plus `extra`; entries in `extra` win.
    pub fn with_overrides(extra: BTreeMap<String, String>) -> Self {
        let mut names: BTreeMap<String, String> = BUILTIN_NAMES
            .iter()
            .map(|(s, n)| (s.to_string(), n.to_string()))
            .collect();
        for (symbol, name) in extra {
            names.insert(symbol.trim().to_uppercase(), name);
        }
        Self { names }
    }

    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.names.get(symbol).map(String::as_str).unwrap_or(symbol)
    }

    pub fn resolve<S: AsRef<str>>(&self, symbols: &[S]) -> TickerMap {
        let mut map = TickerMap::default();
        for symbol in symbols {
            let symbol = symbol.as_ref();
            map.push(symbol, self.display_name(symbol));
        }
        map
    }

    /// Parse and resolve a raw comma-separated input string.
    pub fn resolve_input(&self, input: &str) -> TickerMap {
        self.resolve(&parse_tickers(input))
    }
}

/// Split a comma-separated ticker list.
///
/// Entries are trimmed and upper-cased; empty entries (`"AAPL,,MSFT"`, a
/// trailing comma) are dropped so they never turn into failed fetches.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A symbol and the label it is shown under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
}

/// Ordered symbol → display-name map, input order, no duplicate symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickerMap {
    entries: Vec<Ticker>,
}

impl TickerMap {
    /// Append unless the symbol is already present.
    pub fn push(&mut self, symbol: impl Into<String>, name: impl Into<String>) {
        let symbol = symbol.into();
        if self.contains(&symbol) {
            return;
        }
        self.entries.push(Ticker {
            symbol,
            name: name.into(),
        });
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|t| t.symbol == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.entries.iter()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|t| t.symbol.as_str()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for TickerMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = TickerMap::default();
        for (symbol, name) in iter {
            map.push(symbol, name);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_tickers(" AAPL, msft ,,GOOGL, "),
            vec!["AAPL", "MSFT", "GOOGL"]
        );
        assert!(parse_tickers("").is_empty());
        assert!(parse_tickers(" , ,").is_empty());
    }

    #[test]
    fn known_symbols_get_builtin_names() {
        let map = NameTable::builtin().resolve_input("AAPL, MSFT, GOOGL");
        assert_eq!(map.names(), vec!["Apple", "Microsoft", "Google"]);
        assert_eq!(map.symbols(), vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn unknown_symbol_falls_back_to_itself() {
        let map = NameTable::builtin().resolve_input("AAPL, BADSYM");
        assert_eq!(map.names(), vec!["Apple", "BADSYM"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let map = NameTable::builtin().resolve_input("TM, AAPL, tm");
        assert_eq!(map.len(), 2);
        assert_eq!(map.names(), vec!["TOYOTA", "Apple"]);
    }

    #[test]
    fn overrides_replace_builtin_names() {
        let mut extra = BTreeMap::new();
        extra.insert("meta".to_string(), "Meta Platforms".to_string());
        let table = NameTable::with_overrides(extra);
        assert_eq!(table.display_name("META"), "Meta Platforms");
        assert_eq!(table.display_name("NFLX"), "Netflix");
    }
}
