//! IRI query form of a check sequence.
//!
//! `https://example.com/~jdoe/outbox?type=Note&type=Image&object.type=Create&after=<iri>&maxItems=10`
//!
//! - `type` values at one nesting level form a single `HasType` set.
//! - `object.<key>` and `actor.<key>` at one level form a single nested check.
//! - `id`, `attributedTo`, `after`, and `maxItems` map one-to-one.
//! - An empty type set is written `type=`; an empty nested check is written
//!   `object=` / `actor=`.
//!
//! `Any`, `All`, and `Not` have no query form.

use apstore_types::{Iri, ItemType};

use crate::check::{Check, Checks};
use crate::error::{FilterError, FilterResult};

const KEY_TYPE: &str = "type";
const KEY_ID: &str = "id";
const KEY_ATTRIBUTED_TO: &str = "attributedTo";
const KEY_AFTER: &str = "after";
const KEY_MAX_ITEMS: &str = "maxItems";
const KEY_OBJECT: &str = "object";
const KEY_ACTOR: &str = "actor";
const PREFIX_OBJECT: &str = "object.";
const PREFIX_ACTOR: &str = "actor.";

/// Encode `checks` as a query string (without the leading `?`).
pub fn encode(checks: &Checks) -> FilterResult<String> {
    let mut pairs = Vec::new();
    encode_level(checks, "", true, &mut pairs)?;
    Ok(pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={}", escape(&v)))
        .collect::<Vec<_>>()
        .join("&"))
}

/// Decode a query string (without the leading `?`).
pub fn decode(query: &str) -> FilterResult<Checks> {
    let mut pairs = Vec::new();
    for part in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| FilterError::InvalidQuery(format!("missing '=' in {part:?}")))?;
        pairs.push((unescape(key)?, unescape(value)?));
    }
    decode_level(pairs, true)
}

/// `<base>?<encoded checks>`; any existing query on `base` is replaced.
pub fn to_iri(base: &Iri, checks: &Checks) -> FilterResult<Iri> {
    Ok(base.with_query(&encode(checks)?))
}

/// Decode the query component of `iri`; no query means no checks.
pub fn from_iri(iri: &Iri) -> FilterResult<Checks> {
    iri.query().map_or_else(|| Ok(Checks::default()), decode)
}

fn encode_level(
    checks: &Checks,
    prefix: &str,
    top_level: bool,
    out: &mut Vec<(String, String)>,
) -> FilterResult<()> {
    let mut seen_type = false;
    let mut seen_object = false;
    let mut seen_actor = false;
    for check in checks {
        match check {
            Check::HasType(types) => {
                if seen_type {
                    return Err(FilterError::Unrepresentable(
                        "more than one type set at the same level".into(),
                    ));
                }
                seen_type = true;
                if types.is_empty() {
                    out.push((format!("{prefix}{KEY_TYPE}"), String::new()));
                }
                for t in types {
                    out.push((format!("{prefix}{KEY_TYPE}"), t.as_str().to_string()));
                }
            }
            Check::SameId(iri) => out.push((format!("{prefix}{KEY_ID}"), iri.to_string())),
            Check::AttributedTo(iri) => {
                out.push((format!("{prefix}{KEY_ATTRIBUTED_TO}"), iri.to_string()))
            }
            Check::Object(nested) => {
                if seen_object {
                    return Err(FilterError::Unrepresentable(
                        "more than one object check at the same level".into(),
                    ));
                }
                seen_object = true;
                if nested.is_empty() {
                    out.push((format!("{prefix}{KEY_OBJECT}"), String::new()));
                }
                encode_level(nested, &format!("{prefix}{PREFIX_OBJECT}"), false, out)?;
            }
            Check::Actor(nested) => {
                if seen_actor {
                    return Err(FilterError::Unrepresentable(
                        "more than one actor check at the same level".into(),
                    ));
                }
                seen_actor = true;
                if nested.is_empty() {
                    out.push((format!("{prefix}{KEY_ACTOR}"), String::new()));
                }
                encode_level(nested, &format!("{prefix}{PREFIX_ACTOR}"), false, out)?;
            }
            Check::MaxCount(n) if top_level => out.push((KEY_MAX_ITEMS.into(), n.to_string())),
            Check::After(iri) if top_level => out.push((KEY_AFTER.into(), iri.to_string())),
            Check::MaxCount(_) | Check::After(_) => {
                return Err(FilterError::Unrepresentable(format!(
                    "nested {} check",
                    check.name()
                )))
            }
            Check::Any(_) | Check::All(_) | Check::Not(_) => {
                return Err(FilterError::Unrepresentable(format!(
                    "{} combinator",
                    check.name()
                )))
            }
        }
    }
    Ok(())
}

/// Position-preserving accumulator for one nesting level.
enum Slot {
    Done(Check),
    Types(Vec<ItemType>),
    Object(Vec<(String, String)>),
    Actor(Vec<(String, String)>),
}

/// Index of the slot tracked by `at`, pushing `empty` on first use.
fn slot_at(slots: &mut Vec<Slot>, at: &mut Option<usize>, empty: fn() -> Slot) -> usize {
    *at.get_or_insert_with(|| {
        slots.push(empty());
        slots.len() - 1
    })
}

fn marker(key: &str, value: &str) -> FilterResult<()> {
    if value.is_empty() {
        Ok(())
    } else {
        Err(FilterError::InvalidQuery(format!("{key} takes no value, got {value:?}")))
    }
}

fn decode_level(pairs: Vec<(String, String)>, top_level: bool) -> FilterResult<Checks> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut types_at = None;
    let mut object_at = None;
    let mut actor_at = None;

    for (key, value) in pairs {
        if let Some(rest) = key.strip_prefix(PREFIX_OBJECT) {
            let idx = slot_at(&mut slots, &mut object_at, || Slot::Object(Vec::new()));
            if let Slot::Object(sub) = &mut slots[idx] {
                sub.push((rest.to_string(), value));
            }
            continue;
        }
        if let Some(rest) = key.strip_prefix(PREFIX_ACTOR) {
            let idx = slot_at(&mut slots, &mut actor_at, || Slot::Actor(Vec::new()));
            if let Slot::Actor(sub) = &mut slots[idx] {
                sub.push((rest.to_string(), value));
            }
            continue;
        }
        match key.as_str() {
            KEY_OBJECT => {
                marker(KEY_OBJECT, &value)?;
                slot_at(&mut slots, &mut object_at, || Slot::Object(Vec::new()));
            }
            KEY_ACTOR => {
                marker(KEY_ACTOR, &value)?;
                slot_at(&mut slots, &mut actor_at, || Slot::Actor(Vec::new()));
            }
            KEY_TYPE => {
                let idx = slot_at(&mut slots, &mut types_at, || Slot::Types(Vec::new()));
                if value.is_empty() {
                    continue;
                }
                let t: ItemType = value.parse()?;
                if let Slot::Types(types) = &mut slots[idx] {
                    types.push(t);
                }
            }
            KEY_ID => slots.push(Slot::Done(Check::SameId(Iri::parse(value)?))),
            KEY_ATTRIBUTED_TO => {
                slots.push(Slot::Done(Check::AttributedTo(Iri::parse(value)?)))
            }
            KEY_AFTER if top_level => slots.push(Slot::Done(Check::After(Iri::parse(value)?))),
            KEY_MAX_ITEMS if top_level => {
                let n = value.parse::<usize>().map_err(|e| {
                    FilterError::InvalidQuery(format!("maxItems {value:?}: {e}"))
                })?;
                slots.push(Slot::Done(Check::MaxCount(n)));
            }
            other => {
                return Err(FilterError::InvalidQuery(format!("unknown key {other:?}")));
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            Ok(match slot {
                Slot::Done(check) => check,
                Slot::Types(types) => Check::HasType(types),
                Slot::Object(sub) => Check::Object(decode_level(sub, false)?),
                Slot::Actor(sub) => Check::Actor(decode_level(sub, false)?),
            })
        })
        .collect()
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~:/@!$'()*,;".contains(&b)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn unescape(value: &str) -> FilterResult<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .ok_or_else(|| FilterError::InvalidQuery(format!("truncated escape in {value:?}")))?;
            let b = u8::from_str_radix(hex, 16)
                .map_err(|_| FilterError::InvalidQuery(format!("bad escape %{hex}")))?;
            out.push(b);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| FilterError::InvalidQuery(e.to_string()))
}
