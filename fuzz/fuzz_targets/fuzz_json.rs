#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};
use wiretree::{JsonOptions, Tree};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

/// Separators the lenient grammar accepts between tokens.
static SEPARATORS: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b",", b":"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Every tenth run replaces the input with a flag byte and a serialized
/// random document; otherwise libFuzzer mutates as usual.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < 2 || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        let mut len = 1;
        len += append_value(&mut data[len..], size.max(16), max_size - len);
        len += append_separators(&mut data[len..], max_size - len);
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_separators(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let mut written = 0;
        for _ in 0..rng.random_range(1..=limit.min(4)) {
            let sep = SEPARATORS[rng.random_range(0..SEPARATORS.len())];
            if written + sep.len() > limit {
                break;
            }
            buf[written..written + sep.len()].copy_from_slice(sep);
            written += sep.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    if limit < 2 {
        return 0;
    }
    let value = loop {
        let n = with_rng(|rng| rng.random_range(size / 2..size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..n).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryDocument::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };
    let serialized = serde_json::to_vec(&value.0).expect("serializing a generated document");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => Value::from(u.arbitrary::<i64>()?),
            3 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
            }
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let items: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(items.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let members: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(members.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

/// A document is always an object or an array.
#[derive(Debug)]
struct ArbitraryDocument(Value);

impl<'a> Arbitrary<'a> for ArbitraryDocument {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match ArbitraryValue::arbitrary(u)?.0 {
            value @ (Value::Array(_) | Value::Object(_)) => Ok(ArbitraryDocument(value)),
            _ => Err(arbitrary::Error::IncorrectFormat),
        }
    }
}

fn json(data: &[u8]) {
    let Some((&flags, input)) = data.split_first() else {
        return;
    };
    let options = JsonOptions {
        unquoted_literals: flags & 1 != 0,
        max_depth: usize::from((flags >> 1) & 0x1f),
    };

    let mut tree = Tree::new();
    let parsed = tree.from_json_with(input, options).is_ok();
    assert_eq!(parsed, tree.json_parse_error() == "OK");
    if options.unquoted_literals {
        tree.resolve_all_unquoted();
    }
    let _ = tree.to_protobuf();
    if !tree.is_valid_json() {
        return;
    }

    // rendering is a fixed point once the text has been through the parser
    let text = tree.to_json();
    let mut again = Tree::new();
    let strict = JsonOptions {
        unquoted_literals: false,
        ..options
    };
    if again.from_json_with(&text, strict).is_ok() {
        assert_eq!(again.to_json(), text);
    }
}

fuzz_target!(|data: &[u8]| json(data));
