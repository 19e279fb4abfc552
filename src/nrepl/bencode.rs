//! Minimal bencode support for the nREPL wire protocol
//!
//! Requests are flat dictionaries, so encoding only handles strings,
//! integers, booleans and lists of those. Responses are never parsed into a
//! tree: [`scan_fields`] searches the raw bytes for the handful of fields the
//! bridge cares about. A marker such as `5:value` appearing inside some other
//! payload will be picked up as if it were a real field; nREPL servers in
//! practice do not trigger this, so the scan stays a plain byte search.

const NEW_SESSION: &[u8] = b"11:new-session";
const VALUE: &[u8] = b"5:value";
const ERR: &[u8] = b"3:err";
const ROOT_EX: &[u8] = b"7:root-ex";
const STATUS: &[u8] = b"6:status";
const DONE: &[u8] = b"4:done";

/// A scalar that can appear inside a bencode list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// A request value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Scalar>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// An nREPL request: a flat dictionary encoded in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    entries: Vec<(String, Value)>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Keys are not deduplicated or sorted.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// `clone` request that asks the server for a fresh session
    pub fn clone_session() -> Self {
        Self::new()
            .with("op", "clone")
            .with("verbose", 1_i64)
            .with("prompt", 1_i64)
    }

    /// `eval` request for `code` inside `session`
    pub fn eval(code: &str, session: &str) -> Self {
        Self::new()
            .with("op", "eval")
            .with("code", code)
            .with("session", session)
    }

    /// Encode as a bencode dictionary
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.push(b'd');
        for (key, value) in &self.entries {
            encode_str(&mut out, key);
            match value {
                Value::Str(s) => encode_str(&mut out, s),
                Value::Int(n) => encode_int(&mut out, *n),
                Value::Bool(b) => encode_int(&mut out, i64::from(*b)),
                Value::List(items) => {
                    out.push(b'l');
                    for item in items {
                        match item {
                            Scalar::Str(s) => encode_str(&mut out, s),
                            Scalar::Int(n) => encode_int(&mut out, *n),
                            Scalar::Bool(b) => encode_int(&mut out, i64::from(*b)),
                        }
                    }
                    out.push(b'e');
                }
            }
        }
        out.push(b'e');
        out
    }
}

fn encode_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(s.as_bytes());
}

fn encode_int(out: &mut Vec<u8>, n: i64) {
    out.push(b'i');
    out.extend_from_slice(n.to_string().as_bytes());
    out.push(b'e');
}

/// Fields recovered from a (possibly partial) response buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFields {
    pub new_session: Option<String>,
    pub value: Option<String>,
    pub err: Option<String>,
    pub root_ex: Option<String>,
    pub status: Vec<String>,
}

impl ResponseFields {
    /// Whether the server has reported the exchange as finished
    pub fn is_done(&self) -> bool {
        self.status.iter().any(|s| s == "done")
    }
}

/// Scan `data` for the known response fields.
///
/// Each field is looked up independently; a field that has not arrived yet is
/// simply `None`. A payload whose declared length runs past the end of the
/// buffer is truncated to the bytes present.
pub fn scan_fields(data: &[u8]) -> ResponseFields {
    let mut fields = ResponseFields {
        new_session: scan_string(data, NEW_SESSION),
        value: scan_string(data, VALUE),
        err: scan_string(data, ERR),
        root_ex: scan_string(data, ROOT_EX),
        status: Vec::new(),
    };

    if let Some(at) = find(data, STATUS) {
        if find(&data[at + STATUS.len()..], DONE).is_some() {
            fields.status.push("done".to_string());
        }
    }

    fields
}

/// Find the first `marker<len>:` and return the `len` bytes that follow it
fn scan_string(data: &[u8], marker: &[u8]) -> Option<String> {
    let mut from = 0;
    while let Some(offset) = find(&data[from..], marker) {
        let start = from + offset + marker.len();
        if let Some((len, payload_at)) = read_length(data, start) {
            let end = payload_at.saturating_add(len).min(data.len());
            return Some(String::from_utf8_lossy(&data[payload_at..end]).into_owned());
        }
        from = from + offset + 1;
    }
    None
}

/// Parse `<digits>:` at `start`, returning the length and the payload offset
fn read_length(data: &[u8], start: usize) -> Option<(usize, usize)> {
    let digits = data[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let colon = start + digits;
    if data.get(colon) != Some(&b':') {
        return None;
    }
    let len = std::str::from_utf8(&data[start..colon]).ok()?.parse().ok()?;
    Some((len, colon + 1))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_clone_request() {
        assert_eq!(
            Request::clone_session().encode(),
            b"d2:op5:clone7:verbosei1e6:prompti1ee".to_vec()
        );
    }

    #[test]
    fn test_encode_eval_request_keeps_insertion_order() {
        let encoded = Request::eval("(+ 1 1)", "abc").encode();
        assert_eq!(encoded, b"d2:op4:eval4:code7:(+ 1 1)7:session3:abce".to_vec());
    }

    #[test]
    fn test_encode_bool_and_list() {
        let request = Request::new().with("flag", false).with(
            "items",
            Value::List(vec![
                Scalar::Str("a".to_string()),
                Scalar::Int(-3),
                Scalar::Bool(true),
            ]),
        );
        assert_eq!(request.encode(), b"d4:flagi0e5:itemsl1:ai-3ei1eee".to_vec());
    }

    #[test]
    fn test_encode_uses_byte_length() {
        let encoded = Request::new().with("code", "λ").encode();
        assert_eq!(encoded, "d4:code2:λe".as_bytes().to_vec());
    }

    #[test]
    fn test_scan_session_response() {
        let data = b"d2:id0:11:new-session36:2f5c0bb1-2c5d-4a3b-9b55-0c1e1f7a8e226:statusl4:doneee";
        let fields = scan_fields(data);
        assert_eq!(
            fields.new_session.as_deref(),
            Some("2f5c0bb1-2c5d-4a3b-9b55-0c1e1f7a8e22")
        );
        assert!(fields.is_done());
        assert!(fields.value.is_none());
    }

    #[test]
    fn test_scan_value_then_done_across_messages() {
        let data = b"d2:ns4:user5:value1:27:session3:abced6:statusl4:donee7:session3:abce";
        let fields = scan_fields(data);
        assert_eq!(fields.value.as_deref(), Some("2"));
        assert!(fields.is_done());
        assert!(fields.err.is_none());
        assert!(fields.root_ex.is_none());
    }

    #[test]
    fn test_scan_error_fields() {
        let data = b"d3:err16:NameError: foo\n!7:root-ex9:NameErrore";
        let fields = scan_fields(data);
        assert_eq!(fields.err.as_deref(), Some("NameError: foo\n!"));
        assert_eq!(fields.root_ex.as_deref(), Some("NameError"));
        assert!(!fields.is_done());
    }

    #[test]
    fn test_scan_partial_buffer() {
        let fields = scan_fields(b"d5:value10:hello");
        assert_eq!(fields.value.as_deref(), Some("hello"));

        let fields = scan_fields(b"d5:val");
        assert_eq!(fields, ResponseFields::default());
    }

    #[test]
    fn test_status_without_done_is_not_complete() {
        let fields = scan_fields(b"d6:statusl5:errore4:done");
        assert!(fields.is_done());

        let fields = scan_fields(b"d4:done6:statusl5:erroree");
        assert!(!fields.is_done());
    }

    #[test]
    fn test_scan_skips_marker_without_length() {
        let data = b"d3:out7:5:valuee5:value3:abce";
        assert_eq!(scan_fields(data).value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_encoded_strings_are_recoverable_by_scan() {
        for text in ["", "2", "line one\nline two", "{:a 1}", "ünïcödé"] {
            let encoded = Request::new()
                .with("value", text)
                .with("err", text)
                .with("root-ex", text)
                .with("new-session", text)
                .encode();
            let fields = scan_fields(&encoded);
            assert_eq!(fields.value.as_deref(), Some(text));
            assert_eq!(fields.err.as_deref(), Some(text));
            assert_eq!(fields.root_ex.as_deref(), Some(text));
            assert_eq!(fields.new_session.as_deref(), Some(text));
        }
    }
}
