//! Key-value messages exchanged with the companion app
//!
//! Both directions carry a dictionary: a tuple count followed by tuples of
//! `key: u32 LE`, `type: u8`, `length: u16 LE` and `length` value bytes.
//! String values include their NUL terminator, integers are 1, 2 or 4 bytes
//! little endian.

use heapless::String;

/// Size of the inbox and outbox buffers
pub const MAX_MESSAGE_LEN: usize = 96;

/// Longest stored weather field, including room for a terminator on the wire
pub const MAX_FIELD_LEN: usize = 32;

/// Outbound: ask the companion for fresh weather
pub const KEY_REQUEST: u32 = 0;
/// Inbound: city name
pub const KEY_CITY: u32 = 0;
/// Inbound: temperature text, already formatted by the companion
pub const KEY_TEMP: u32 = 1;
/// Inbound: weather icon code
pub const KEY_ICON: u32 = 2;

const HEADER_LEN: usize = 7;

const TYPE_BYTES: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Weather text field as stored on the watch
pub type Field = String<MAX_FIELD_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DictionaryError {
    /// Input ends inside a tuple
    Truncated,
    /// Unknown tuple type tag
    UnknownType(u8),
    /// Integer tuple with a width other than 1, 2 or 4
    InvalidLength(u16),
    /// String tuple that is not UTF-8
    InvalidUtf8,
    /// Output buffer is too small
    BufferFull,
}

/// Messaging channel failures. None of them are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// No companion connected
    NotConnected,
    /// A previous message is still in flight
    Busy,
    /// The link refused or lost the message
    SendFailed,
    /// Payload could not be encoded or decoded
    Malformed(DictionaryError),
}

impl From<DictionaryError> for MessageError {
    fn from(err: DictionaryError) -> Self {
        MessageError::Malformed(err)
    }
}

/// Value of a single tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Bytes(&'a [u8]),
    CString(&'a str),
    Uint(u32),
    Int(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuple<'a> {
    pub key: u32,
    pub value: Value<'a>,
}

/// A validated, borrowed dictionary
#[derive(Debug, Clone, Copy)]
pub struct Dictionary<'a> {
    count: u8,
    tuples: &'a [u8],
}

impl<'a> Dictionary<'a> {
    /// Validate every tuple in `bytes`.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DictionaryError> {
        let (&count, tuples) = bytes.split_first().ok_or(DictionaryError::Truncated)?;

        let mut rest = tuples;
        for _ in 0..count {
            let (_, next) = read_tuple(rest)?;
            rest = next;
        }

        Ok(Self { count, tuples })
    }

    pub fn len(&self) -> usize {
        usize::from(self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> Tuples<'a> {
        Tuples {
            remaining: self.count,
            bytes: self.tuples,
        }
    }

    /// First tuple with `key`
    pub fn find(&self, key: u32) -> Option<Tuple<'a>> {
        self.iter().find(|tuple| tuple.key == key)
    }
}

/// Iterator over the tuples of a [`Dictionary`]
pub struct Tuples<'a> {
    remaining: u8,
    bytes: &'a [u8],
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // Already validated by `Dictionary::parse`
        let (tuple, rest) = read_tuple(self.bytes).ok()?;
        self.remaining -= 1;
        self.bytes = rest;
        Some(tuple)
    }
}

fn read_tuple(bytes: &[u8]) -> Result<(Tuple<'_>, &[u8]), DictionaryError> {
    if bytes.len() < HEADER_LEN {
        return Err(DictionaryError::Truncated);
    }
    let (header, rest) = bytes.split_at(HEADER_LEN);
    let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let kind = header[4];
    let length = u16::from_le_bytes([header[5], header[6]]);

    if rest.len() < usize::from(length) {
        return Err(DictionaryError::Truncated);
    }
    let (raw, rest) = rest.split_at(usize::from(length));

    let value = match kind {
        TYPE_BYTES => Value::Bytes(raw),
        TYPE_CSTRING => {
            // Stop at the terminator, senders may pad after it
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            let text =
                core::str::from_utf8(&raw[..end]).map_err(|_| DictionaryError::InvalidUtf8)?;
            Value::CString(text)
        }
        TYPE_UINT => Value::Uint(read_le(raw, length)?),
        TYPE_INT => Value::Int(match raw {
            [b] => i32::from(*b as i8),
            [a, b] => i32::from(i16::from_le_bytes([*a, *b])),
            _ => read_le(raw, length)? as i32,
        }),
        other => return Err(DictionaryError::UnknownType(other)),
    };

    Ok((Tuple { key, value }, rest))
}

fn read_le(raw: &[u8], length: u16) -> Result<u32, DictionaryError> {
    match *raw {
        [a] => Ok(u32::from(a)),
        [a, b] => Ok(u32::from(u16::from_le_bytes([a, b]))),
        [a, b, c, d] => Ok(u32::from_le_bytes([a, b, c, d])),
        _ => Err(DictionaryError::InvalidLength(length)),
    }
}

/// Builds a dictionary in a caller provided buffer
pub struct DictionaryWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> DictionaryWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Result<Self, DictionaryError> {
        let count = buf.first_mut().ok_or(DictionaryError::BufferFull)?;
        *count = 0;
        Ok(Self { buf, len: 1 })
    }

    pub fn write_uint8(&mut self, key: u32, value: u8) -> Result<(), DictionaryError> {
        self.push(key, TYPE_UINT, &[value], false)
    }

    pub fn write_int32(&mut self, key: u32, value: i32) -> Result<(), DictionaryError> {
        self.push(key, TYPE_INT, &value.to_le_bytes(), false)
    }

    pub fn write_cstring(&mut self, key: u32, value: &str) -> Result<(), DictionaryError> {
        self.push(key, TYPE_CSTRING, value.as_bytes(), true)
    }

    /// Finish the dictionary and return the encoded bytes.
    pub fn finish(self) -> &'a [u8] {
        let len = self.len;
        let buf = self.buf;
        &buf[..len]
    }

    fn push(&mut self, key: u32, kind: u8, value: &[u8], nul: bool) -> Result<(), DictionaryError> {
        let length = value.len() + usize::from(nul);
        let wire_len = u16::try_from(length).map_err(|_| DictionaryError::BufferFull)?;
        let end = self.len + HEADER_LEN + length;
        if end > self.buf.len() || self.buf[0] == u8::MAX {
            return Err(DictionaryError::BufferFull);
        }

        let tuple = &mut self.buf[self.len..end];
        tuple[..4].copy_from_slice(&key.to_le_bytes());
        tuple[4] = kind;
        tuple[5..7].copy_from_slice(&wire_len.to_le_bytes());
        tuple[HEADER_LEN..HEADER_LEN + value.len()].copy_from_slice(value);
        if nul {
            tuple[HEADER_LEN + value.len()] = 0;
        }

        self.buf[0] += 1;
        self.len = end;
        Ok(())
    }
}

/// Encode the outbound weather request: a single placeholder tuple.
pub fn encode_weather_request(buf: &mut [u8]) -> Result<&[u8], DictionaryError> {
    let mut writer = DictionaryWriter::new(buf)?;
    writer.write_uint8(KEY_REQUEST, 0)?;
    Ok(writer.finish())
}

/// Weather fields carried by an inbound message. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxMessage {
    pub city: Option<Field>,
    pub temperature: Option<Field>,
    pub icon: Option<Field>,
}

impl InboxMessage {
    /// Decode an inbound dictionary. Non-string values count as absent.
    pub fn decode(bytes: &[u8]) -> Result<Self, DictionaryError> {
        let dict = Dictionary::parse(bytes)?;
        let field = |key| match dict.find(key) {
            Some(Tuple {
                value: Value::CString(text),
                ..
            }) => Some(truncated(text)),
            _ => None,
        };

        Ok(Self {
            city: field(KEY_CITY),
            temperature: field(KEY_TEMP),
            icon: field(KEY_ICON),
        })
    }

    /// All three fields, or `None` if any is missing.
    pub fn weather(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.city.as_deref()?,
            self.temperature.as_deref()?,
            self.icon.as_deref()?,
        ))
    }
}

/// Copy `text` into a field, cutting at a character boundary when too long.
pub fn truncated(text: &str) -> Field {
    let mut field = Field::new();
    for c in text.chars() {
        if field.push(c).is_err() {
            break;
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_message<'a>(
        buf: &'a mut [u8],
        city: &str,
        temp: Option<&str>,
        icon: &str,
    ) -> &'a [u8] {
        let mut writer = DictionaryWriter::new(buf).unwrap();
        writer.write_cstring(KEY_CITY, city).unwrap();
        if let Some(temp) = temp {
            writer.write_cstring(KEY_TEMP, temp).unwrap();
        }
        writer.write_cstring(KEY_ICON, icon).unwrap();
        writer.finish()
    }

    #[test]
    fn test_weather_request_layout() {
        let mut buf = [0xAA; MAX_MESSAGE_LEN];
        let bytes = encode_weather_request(&mut buf).unwrap();
        assert_eq!(bytes, &[1, 0, 0, 0, 0, TYPE_UINT, 1, 0, 0]);
    }

    #[test]
    fn test_decode_full_weather_message() {
        let mut buf = [0; MAX_MESSAGE_LEN];
        let bytes = weather_message(&mut buf, "San Antonio", Some("72°"), "clear-day");
        let message = InboxMessage::decode(bytes).unwrap();
        assert_eq!(message.weather(), Some(("San Antonio", "72°", "clear-day")));
    }

    #[test]
    fn test_missing_field_is_reported_absent() {
        let mut buf = [0; MAX_MESSAGE_LEN];
        let bytes = weather_message(&mut buf, "Austin", None, "rain");
        let message = InboxMessage::decode(bytes).unwrap();
        assert_eq!(message.temperature, None);
        assert_eq!(message.city.as_deref(), Some("Austin"));
        assert_eq!(message.weather(), None);
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let mut buf = [0; MAX_MESSAGE_LEN];
        let mut writer = DictionaryWriter::new(&mut buf).unwrap();
        writer.write_cstring(KEY_CITY, "Austin").unwrap();
        writer.write_int32(KEY_TEMP, -3).unwrap();
        writer.write_cstring(KEY_ICON, "snow").unwrap();
        let message = InboxMessage::decode(writer.finish()).unwrap();
        assert_eq!(message.temperature, None);
    }

    #[test]
    fn test_integer_widths() {
        let bytes = [
            3, //
            5, 0, 0, 0, TYPE_INT, 1, 0, 0xFF, //
            6, 0, 0, 0, TYPE_UINT, 2, 0, 0x34, 0x12, //
            7, 0, 0, 0, TYPE_INT, 4, 0, 0xFE, 0xFF, 0xFF, 0xFF,
        ];
        let dict = Dictionary::parse(&bytes).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.find(5).unwrap().value, Value::Int(-1));
        assert_eq!(dict.find(6).unwrap().value, Value::Uint(0x1234));
        assert_eq!(dict.find(7).unwrap().value, Value::Int(-2));
        assert_eq!(dict.find(8), None);
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let mut buf = [0; MAX_MESSAGE_LEN];
        let bytes = weather_message(&mut buf, "Austin", Some("80°"), "fog");
        for cut in 0..bytes.len() {
            assert_eq!(
                Dictionary::parse(&bytes[..cut]).err(),
                Some(DictionaryError::Truncated),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_malformed_tuples_are_rejected() {
        let unknown = [1, 0, 0, 0, 0, 9, 1, 0, 0];
        assert_eq!(
            Dictionary::parse(&unknown).err(),
            Some(DictionaryError::UnknownType(9))
        );

        let wide = [1, 0, 0, 0, 0, TYPE_UINT, 3, 0, 1, 2, 3];
        assert_eq!(
            Dictionary::parse(&wide).err(),
            Some(DictionaryError::InvalidLength(3))
        );

        let latin1 = [1, 0, 0, 0, 0, TYPE_CSTRING, 2, 0, 0xB0, 0];
        assert_eq!(
            Dictionary::parse(&latin1).err(),
            Some(DictionaryError::InvalidUtf8)
        );
    }

    #[test]
    fn test_writer_respects_buffer_size() {
        let mut buf = [0; 16];
        let mut writer = DictionaryWriter::new(&mut buf).unwrap();
        writer.write_cstring(KEY_CITY, "Paris").unwrap();
        assert_eq!(
            writer.write_cstring(KEY_TEMP, "21°"),
            Err(DictionaryError::BufferFull)
        );
        // The failed write leaves the dictionary intact
        let dict = Dictionary::parse(writer.finish()).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.find(KEY_CITY).unwrap().value, Value::CString("Paris"));
    }

    #[test]
    fn test_long_fields_are_cut_on_char_boundary() {
        let long = "Llanfairpwllgwyngyllgogerychwyrndrobwll";
        assert_eq!(truncated(long).len(), MAX_FIELD_LEN);

        let accents = "ééééééééééééééééé"; // 17 two-byte chars
        let field = truncated(accents);
        assert_eq!(field.len(), 32);
        assert_eq!(field.chars().count(), 16);
    }
}
