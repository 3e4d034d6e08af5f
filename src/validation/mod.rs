//! Submission validation for catalog items and accounts.
//!
//! Validation is stateless: a raw field/value map goes in, and either a fully
//! populated draft or a map of field errors comes out. Nothing here touches the
//! store; uniqueness checks (usernames) happen in the handlers.

pub mod user;

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::database::models::ItemDraft;

pub use user::{validate_registration, Registration};

/// Raw submitted fields, as received from a form post or a flattened JSON body.
pub type RawSubmission = HashMap<String, String>;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_AN_INTEGER: &str = "Enter a whole number.";
pub const NOT_A_URL: &str = "Enter a valid URL.";

pub const NAME_MAX_LEN: usize = 255;
pub const THUMBNAIL_MAX_LEN: usize = 500;
pub const CATEGORY_MAX_LEN: usize = 100;
pub const BRAND_MAX_LEN: usize = 100;
pub const SIZE_MAX_LEN: usize = 10;

/// Field name -> human readable messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when no error has been recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

static TAG: Lazy<Regex> = Lazy::new(|| {
    // A tag starts with a letter, '/', '!' or '?'. "a < b" is left alone.
    Regex::new(r"<[A-Za-z/!?][^>]*>").expect("tag pattern is valid")
});

/// Removes `<...>` markup, keeping the inner text. Repeats until nothing is left
/// to strip so that split tags like `<<b>script>` cannot reassemble.
pub fn strip_tags(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let next = TAG.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Flattens a JSON object body into the same shape a form post produces.
/// Numbers and booleans keep their textual form; `null` becomes an empty value.
pub fn submission_from_json(value: Value) -> Option<RawSubmission> {
    let Value::Object(map) = value else {
        return None;
    };

    let fields = map
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect();

    Some(fields)
}

/// Validates an item submission into a draft with no owner.
pub fn validate_item(raw: &RawSubmission) -> Result<ItemDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = required_text(raw, "name", Some(NAME_MAX_LEN), true, &mut errors);
    let description = required_text(raw, "description", None, true, &mut errors);
    let thumbnail = required_text(raw, "thumbnail", Some(THUMBNAIL_MAX_LEN), false, &mut errors);
    let category = required_text(raw, "category", Some(CATEGORY_MAX_LEN), false, &mut errors);
    let brand = optional_text(raw, "brand", BRAND_MAX_LEN, &mut errors);
    let size = optional_text(raw, "size", SIZE_MAX_LEN, &mut errors);

    if !thumbnail.is_empty() && !is_valid_url(&thumbnail) {
        errors.add("thumbnail", NOT_A_URL);
    }

    let price = match field(raw, "price") {
        "" => {
            errors.add("price", REQUIRED);
            0
        }
        text => parse_integer(text).unwrap_or_else(|| {
            errors.add("price", NOT_AN_INTEGER);
            0
        }),
    };

    let stock = match field(raw, "stock") {
        "" => 0,
        text => parse_integer(text).unwrap_or_else(|| {
            errors.add("stock", NOT_AN_INTEGER);
            0
        }),
    };

    let is_featured = parse_checkbox(raw.get("is_featured").map(String::as_str));

    errors.into_result(|| ItemDraft {
        name,
        price,
        description,
        thumbnail,
        category,
        is_featured,
        brand,
        stock,
        size,
    })
}

fn field<'a>(raw: &'a RawSubmission, name: &str) -> &'a str {
    raw.get(name).map(|v| v.trim()).unwrap_or("")
}

fn required_text(
    raw: &RawSubmission,
    name: &str,
    max_len: Option<usize>,
    strip: bool,
    errors: &mut FieldErrors,
) -> String {
    let value = field(raw, name);
    let value = if strip { strip_tags(value).trim().to_string() } else { value.to_string() };

    if value.is_empty() {
        errors.add(name, REQUIRED);
    } else if let Some(max) = max_len {
        check_length(name, &value, max, errors);
    }
    value
}

fn optional_text(raw: &RawSubmission, name: &str, max_len: usize, errors: &mut FieldErrors) -> Option<String> {
    let value = field(raw, name);
    if value.is_empty() {
        return None;
    }
    check_length(name, value, max_len, errors);
    Some(value.to_string())
}

fn check_length(name: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            name,
            format!("Ensure this value has at most {} characters (it has {}).", max, len),
        );
    }
}

/// Accepts "12", " 12 " and "12.00"; rejects "12.5" and "twelve".
fn parse_integer(text: &str) -> Option<i64> {
    let digits = match text.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => text,
    };
    digits.parse().ok()
}

pub fn parse_checkbox(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "false" | "0" | "off"),
    }
}

fn is_valid_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "ftp" | "ftps") && url.host_str().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(pairs: &[(&str, &str)]) -> RawSubmission {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn valid() -> RawSubmission {
        submission(&[
            ("name", "Ball"),
            ("price", "1000"),
            ("description", "<b>x</b>"),
            ("category", "Ball"),
            ("thumbnail", "http://x"),
        ])
    }

    #[test]
    fn strips_tags_but_keeps_text() {
        assert_eq!(strip_tags("<b>x</b>"), "x");
        assert_eq!(strip_tags("<p class=\"a\">Hello <i>there</i></p>"), "Hello there");
        assert_eq!(strip_tags("<<b>script>alert(1)<</b>/script>"), "alert(1)");
        assert_eq!(strip_tags("3 < 4"), "3 < 4");
        assert!(!TAG.is_match(&strip_tags("<scr<script>ipt>x")));
    }

    #[test]
    fn valid_submission_produces_draft() {
        let draft = validate_item(&valid()).unwrap();
        assert_eq!(draft.name, "Ball");
        assert_eq!(draft.price, 1000);
        assert_eq!(draft.description, "x");
        assert_eq!(draft.stock, 0);
        assert!(!draft.is_featured);
        assert_eq!(draft.brand, None);
        assert_eq!(draft.size, None);
    }

    #[test]
    fn empty_optional_text_becomes_none() {
        let mut raw = valid();
        raw.insert("brand".into(), "".into());
        raw.insert("size".into(), "  ".into());
        raw.insert("stock".into(), "".into());
        let draft = validate_item(&raw).unwrap();
        assert_eq!(draft.brand, None);
        assert_eq!(draft.size, None);
        assert_eq!(draft.stock, 0);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let errors = validate_item(&RawSubmission::new()).unwrap_err();
        for name in ["name", "price", "description", "thumbnail", "category"] {
            assert_eq!(errors.get(name), Some(&[REQUIRED.to_string()][..]), "{}", name);
        }
        assert!(!errors.contains("stock"));
    }

    #[test]
    fn markup_only_name_counts_as_empty() {
        let mut raw = valid();
        raw.insert("name".into(), "<b></b>".into());
        let errors = validate_item(&raw).unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn rejects_non_integer_numbers() {
        let mut raw = valid();
        raw.insert("price".into(), "12.5".into());
        raw.insert("stock".into(), "many".into());
        let errors = validate_item(&raw).unwrap_err();
        assert_eq!(errors.get("price").unwrap()[0], NOT_AN_INTEGER);
        assert_eq!(errors.get("stock").unwrap()[0], NOT_AN_INTEGER);

        raw.insert("price".into(), "1200.00".into());
        raw.insert("stock".into(), " 3 ".into());
        let draft = validate_item(&raw).unwrap();
        assert_eq!((draft.price, draft.stock), (1200, 3));
    }

    #[test]
    fn enforces_length_limits() {
        let mut raw = valid();
        raw.insert("size".into(), "XXXXXXXXXXL".into());
        raw.insert("category".into(), "c".repeat(101));
        let errors = validate_item(&raw).unwrap_err();
        assert_eq!(
            errors.get("size").unwrap()[0],
            "Ensure this value has at most 10 characters (it has 11)."
        );
        assert!(errors.contains("category"));
    }

    #[test]
    fn thumbnail_must_be_a_url() {
        let mut raw = valid();
        raw.insert("thumbnail".into(), "not a url".into());
        assert_eq!(validate_item(&raw).unwrap_err().get("thumbnail").unwrap()[0], NOT_A_URL);
    }

    #[test]
    fn checkbox_values() {
        assert!(parse_checkbox(Some("on")));
        assert!(parse_checkbox(Some("true")));
        assert!(parse_checkbox(Some("True")));
        assert!(!parse_checkbox(Some("false")));
        assert!(!parse_checkbox(Some("")));
        assert!(!parse_checkbox(None));
    }

    #[test]
    fn json_bodies_flatten_to_text() {
        let raw = submission_from_json(serde_json::json!({
            "name": "Ball",
            "price": 1000,
            "is_featured": true,
            "brand": null
        }))
        .unwrap();
        assert_eq!(raw["price"], "1000");
        assert_eq!(raw["is_featured"], "true");
        assert_eq!(raw["brand"], "");
        assert!(submission_from_json(serde_json::json!([1, 2])).is_none());
    }
}
