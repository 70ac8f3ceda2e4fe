//! Status page parsing.
//!
//! The upstream page is a small HTML table of label/value rows, for example
//! `<tr><td>Kvóta</td><td>500 MB</td></tr>`. Parsing never fails: rows that are
//! missing, unknown or malformed leave the corresponding field at zero.

use std::sync::LazyLock;

use fuper_common::Snapshot;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tr").expect("static row selector"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static cell selector"));

/// Markup noise stripped before parsing.
///
/// The page wraps parts of the table in HTML comments, which would hide
/// those rows from a conforming parser.
const NOISE: &[&str] = &["<!--", "-->", "\n"];

/// A field of the status table, keyed by its Czech row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Address,
    Transferred,
    Quota,
    UsagePercent,
    MinSpeed,
    MaxSpeed,
}

impl StatusField {
    /// Look up a row label. Unknown labels return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "IP adresa" => Some(Self::Address),
            "Přeneseno dat" => Some(Self::Transferred),
            "Kvóta" => Some(Self::Quota),
            "Využití kvóty" => Some(Self::UsagePercent),
            "Minimální zaručená rychlost" => Some(Self::MinSpeed),
            "Maximální omezená rychlost" => Some(Self::MaxSpeed),
            _ => None,
        }
    }

    /// Store `value` into the matching snapshot field.
    fn apply(self, snapshot: &mut Snapshot, value: &str) {
        match self {
            Self::Address => snapshot.address = value.to_string(),
            Self::Transferred => snapshot.transferred_amount = parse_or_zero(value),
            Self::Quota => snapshot.quota_amount = parse_or_zero(value),
            Self::UsagePercent => snapshot.usage_percent = parse_or_zero(value),
            Self::MinSpeed => snapshot.min_guaranteed_speed = parse_or_zero(value),
            Self::MaxSpeed => snapshot.max_allowed_speed = parse_or_zero(value),
        }
    }
}

/// Remove comment delimiters and newlines from the raw document.
pub fn clean_markup(raw: &str) -> String {
    NOISE
        .iter()
        .fold(raw.to_string(), |doc, noise| doc.replace(noise, ""))
}

/// First whitespace-delimited token, dropping unit suffixes like "MB" or "kb/s".
///
/// Returns an empty string for blank input.
pub fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

/// Parse a decimal integer, yielding 0 for anything that is not one.
///
/// An optional leading sign is accepted. Overflow also yields 0.
pub fn parse_or_zero(token: &str) -> i64 {
    token.parse().unwrap_or(0)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parse a raw status page into a snapshot.
///
/// For each table row the first cell is the label and the last cell the
/// value. Rows whose label and value are identical (headers, separators,
/// single-cell rows) are skipped.
pub fn parse_status_page(raw: &str) -> Snapshot {
    let document = Html::parse_document(&clean_markup(raw));
    let mut snapshot = Snapshot::default();

    for row in document.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
            continue;
        };

        let key = cell_text(*first);
        let value = cell_text(*last);
        if key == value {
            continue;
        }

        match StatusField::from_label(&key) {
            Some(field) => field.apply(&mut snapshot, first_token(&value)),
            None => trace!(label = %key, "Ignoring unknown status row"),
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"<html>
<head><title>Stav</title></head>
<body>
<table>
<tr><td colspan="2">Informace o připojení</td></tr>
<tr><td>IP adresa</td><td>1.2.3.4</td></tr>
<tr><td>Přeneseno dat</td><td>150 MB</td></tr>
<tr><td>Kvóta</td><td>500 MB</td></tr>
<tr><td>Využití kvóty</td><td>30 %</td></tr>
<tr><td>Minimální zaručená rychlost</td><td>512 kb/s</td></tr>
<tr><td>Maximální omezená rychlost</td><td>2048 kb/s</td></tr>
</table>
</body>
</html>"#;

    #[test]
    fn test_parse_sample_page() {
        let snapshot = parse_status_page(SAMPLE_PAGE);

        assert_eq!(
            snapshot,
            Snapshot {
                address: "1.2.3.4".to_string(),
                transferred_amount: 150,
                quota_amount: 500,
                usage_percent: 30,
                min_guaranteed_speed: 512,
                max_allowed_speed: 2048,
            }
        );
    }

    #[test]
    fn test_commented_out_rows_are_recovered() {
        let page = "<table>\n<!--<tr><td>Kvóta</td><td>700 MB</td></tr>-->\n\
                    <tr><td>Přeneseno dat</td><td>10 MB</td></tr></table>";
        let snapshot = parse_status_page(page);

        assert_eq!(snapshot.quota_amount, 700);
        assert_eq!(snapshot.transferred_amount, 10);
    }

    #[test]
    fn test_unparseable_value_is_zero() {
        let page = "<table>\
                    <tr><td>Kvóta</td><td>neomezeno</td></tr>\
                    <tr><td>Využití kvóty</td><td>30 %</td></tr>\
                    </table>";
        let snapshot = parse_status_page(page);

        assert_eq!(snapshot.quota_amount, 0);
        assert_eq!(snapshot.usage_percent, 30);
    }

    #[test]
    fn test_blank_value_is_zero() {
        let page = "<table><tr><td>Kvóta</td><td>   </td></tr></table>";
        assert_eq!(parse_status_page(page).quota_amount, 0);
    }

    #[test]
    fn test_identical_cells_are_skipped() {
        // Would set the address to "IP adresa" if not skipped
        let page = "<table><tr><td>IP adresa</td><td>IP adresa</td></tr></table>";
        assert_eq!(parse_status_page(page).address, "");
    }

    #[test]
    fn test_cells_differing_only_in_whitespace_are_skipped() {
        // Compared after trimming, so this row is a repeated label
        let page = "<table><tr><td>IP adresa </td><td>IP adresa</td></tr></table>";
        assert_eq!(parse_status_page(page).address, "");
    }

    #[test]
    fn test_label_and_value_use_first_and_last_cell() {
        let page = "<table><tr><td>Kvóta</td><td>ignored</td><td>900 MB</td></tr></table>";
        assert_eq!(parse_status_page(page).quota_amount, 900);
    }

    #[test]
    fn test_unknown_rows_are_ignored() {
        let page = "<table>\
                    <tr><td>Tarif</td><td>Student</td></tr>\
                    <tr><td>Kvóta</td><td>500 MB</td></tr>\
                    </table>";
        let snapshot = parse_status_page(page);

        assert_eq!(snapshot.quota_amount, 500);
        assert_eq!(snapshot.address, "");
    }

    #[test]
    fn test_rows_outside_tables_and_garbage_input() {
        assert_eq!(parse_status_page(""), Snapshot::default());
        assert_eq!(parse_status_page("<p>Kvóta 500 MB</p>"), Snapshot::default());
        assert_eq!(parse_status_page("<table><tr></tr></table>"), Snapshot::default());
    }

    #[test]
    fn test_clean_markup() {
        assert_eq!(clean_markup("a<!--b-->\nc"), "abc");
        assert_eq!(clean_markup("plain"), "plain");
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("150 MB"), "150");
        assert_eq!(first_token("  2048\u{a0}kb/s"), "2048");
        assert_eq!(first_token("1.2.3.4"), "1.2.3.4");
        assert_eq!(first_token(""), "");
        assert_eq!(first_token("   "), "");
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero("42"), 42);
        assert_eq!(parse_or_zero("-7"), -7);
        assert_eq!(parse_or_zero("+7"), 7);
        assert_eq!(parse_or_zero(""), 0);
        assert_eq!(parse_or_zero("12.5"), 0);
        assert_eq!(parse_or_zero("MB"), 0);
        assert_eq!(parse_or_zero("99999999999999999999999"), 0);
    }

    #[test]
    fn test_status_field_from_label() {
        assert_eq!(StatusField::from_label("Kvóta"), Some(StatusField::Quota));
        assert_eq!(
            StatusField::from_label("Maximální omezená rychlost"),
            Some(StatusField::MaxSpeed)
        );
        assert_eq!(StatusField::from_label("kvóta"), None);
        assert_eq!(StatusField::from_label(""), None);
    }
}
