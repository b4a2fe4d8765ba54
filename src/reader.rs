// MIT License - Copyright (c) 2026 Peter Wright
// Line classifier for the lircd socket protocol

use std::fmt;

use crate::constants::{BEGIN, CODE_BYTES, CODE_HEX_DIGITS, DATA, END, ERROR, SUCCESS};
use crate::error::ProtocolError;
use crate::event::{ButtonPress, CommandReply};

/// Upper bound on the data buffer reserved from a declared reply length.
const MAX_RESERVED_DATA_LINES: usize = 1024;

/// Where the reader is within the line stream.
///
/// Outside a transaction every line is a broadcast event. A `BEGIN` line
/// opens a reply transaction which runs through the remaining states and
/// returns to `Idle` on its closing `END`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserState {
    #[default]
    Idle,
    ReplyHeader,
    Status,
    DataStart,
    DataLength,
    DataCollect,
    DataEnd,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ReplyHeader => "reply-header",
            Self::Status => "status",
            Self::DataStart => "data-start",
            Self::DataLength => "data-length",
            Self::DataCollect => "data-collect",
            Self::DataEnd => "data-end",
        };
        f.write_str(name)
    }
}

/// A complete message produced by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Event(ButtonPress),
    Reply(CommandReply),
}

/// Per-transaction accumulator.
#[derive(Debug, Default)]
struct Transaction {
    reply: CommandReply,
    declared: usize,
    consumed: usize,
}

impl Transaction {
    fn finish(&mut self) -> Message {
        Message::Reply(std::mem::take(&mut self.reply))
    }
}

type Transition = std::result::Result<(ParserState, Option<Message>), ProtocolError>;

/// Classifies lines from lircd into events and command replies.
///
/// One reader exists per connection and sees every line in arrival order.
/// Any [`ProtocolError`] discards the transaction in progress and puts the
/// reader back in [`ParserState::Idle`], so the next well-formed line is
/// handled normally.
#[derive(Debug, Default)]
pub struct ProtocolReader {
    state: ParserState,
    txn: Transaction,
}

impl ProtocolReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of data lines the current transaction declared.
    pub fn declared_len(&self) -> usize {
        self.txn.declared
    }

    /// Number of data lines collected so far in the current transaction.
    pub fn consumed_len(&self) -> usize {
        self.txn.consumed
    }

    /// Feed one line (without its terminator) to the reader.
    pub fn read_line(&mut self, line: &str) -> Result<Option<Message>, ProtocolError> {
        match transition(self.state, &mut self.txn, line) {
            Ok((next, message)) => {
                self.state = next;
                Ok(message)
            }
            Err(err) => {
                self.state = ParserState::Idle;
                self.txn = Transaction::default();
                Err(err)
            }
        }
    }
}

fn transition(state: ParserState, txn: &mut Transaction, line: &str) -> Transition {
    match state {
        ParserState::Idle => idle(txn, line),
        ParserState::ReplyHeader => reply_header(txn, line),
        ParserState::Status => status(txn, line),
        ParserState::DataStart => data_start(txn, line),
        ParserState::DataLength => data_length(txn, line),
        ParserState::DataCollect => data_collect(txn, line),
        ParserState::DataEnd => data_end(txn, line),
    }
}

fn idle(txn: &mut Transaction, line: &str) -> Transition {
    if line == BEGIN {
        *txn = Transaction::default();
        return Ok((ParserState::ReplyHeader, None));
    }

    let event = parse_button_press(line)?;
    Ok((ParserState::Idle, Some(Message::Event(event))))
}

fn reply_header(txn: &mut Transaction, line: &str) -> Transition {
    txn.reply = CommandReply {
        command: line.to_string(),
        success: true,
        data: Vec::new(),
    };
    Ok((ParserState::Status, None))
}

fn status(txn: &mut Transaction, line: &str) -> Transition {
    match line {
        SUCCESS => Ok((ParserState::DataStart, None)),
        ERROR => {
            txn.reply.success = false;
            Ok((ParserState::DataStart, None))
        }
        END => Ok((ParserState::Idle, Some(txn.finish()))),
        _ => Err(ProtocolError::InvalidStatus {
            line: line.to_string(),
        }),
    }
}

fn data_start(txn: &mut Transaction, line: &str) -> Transition {
    match line {
        DATA => Ok((ParserState::DataLength, None)),
        END => Ok((ParserState::Idle, Some(txn.finish()))),
        _ => Err(ProtocolError::InvalidDataStart {
            line: line.to_string(),
        }),
    }
}

fn data_length(txn: &mut Transaction, line: &str) -> Transition {
    let declared = parse_decimal(line).ok_or_else(|| ProtocolError::InvalidDataLength {
        line: line.to_string(),
    })?;

    txn.declared = declared;
    txn.consumed = 0;
    txn.reply.data = Vec::with_capacity(declared.min(MAX_RESERVED_DATA_LINES));

    if declared == 0 {
        Ok((ParserState::DataEnd, None))
    } else {
        Ok((ParserState::DataCollect, None))
    }
}

fn data_collect(txn: &mut Transaction, line: &str) -> Transition {
    txn.reply.data.push(line.to_string());
    txn.consumed += 1;

    if txn.consumed >= txn.declared {
        Ok((ParserState::DataEnd, None))
    } else {
        Ok((ParserState::DataCollect, None))
    }
}

fn data_end(txn: &mut Transaction, line: &str) -> Transition {
    if line != END {
        return Err(ProtocolError::MissingDataEnd {
            line: line.to_string(),
            declared: txn.declared,
        });
    }
    Ok((ParserState::Idle, Some(txn.finish())))
}

/// Parse a broadcast line: `<code> <repeat> <button> <remote>`.
pub fn parse_button_press(line: &str) -> Result<ButtonPress, ProtocolError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [code, repeat, button, remote] = fields[..] else {
        return Err(ProtocolError::MalformedEvent {
            line: line.to_string(),
            fields: fields.len(),
        });
    };

    let code = decode_code(code)?;
    let repeat_count = parse_decimal(repeat)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ProtocolError::InvalidRepeatCount {
            repeat: repeat.to_string(),
        })?;

    Ok(ButtonPress {
        code,
        repeat_count,
        button_name: button.to_string(),
        remote_control_name: remote.to_string(),
    })
}

/// Decode the hex code field of a broadcast line into its legacy 16-bit value.
///
/// The field is left-padded with zeros to 16 digits and must decode to
/// exactly 8 bytes; the first two bytes are read little-endian.
pub fn decode_code(code: &str) -> Result<u16, ProtocolError> {
    let invalid = || ProtocolError::InvalidHexCode {
        code: code.to_string(),
    };

    let padded = format!("{:0>width$}", code, width = CODE_HEX_DIGITS);
    if padded.len() % 2 != 0 || !padded.is_ascii() {
        return Err(invalid());
    }

    let bytes = (0..padded.len())
        .step_by(2)
        .map(|i| {
            let pair = &padded[i..i + 2];
            // from_str_radix would accept a leading `+`.
            if pair.starts_with(['+', '-']) {
                return Err(invalid());
            }
            u8::from_str_radix(pair, 16).map_err(|_| invalid())
        })
        .collect::<Result<Vec<u8>, _>>()?;
    if bytes.len() != CODE_BYTES {
        return Err(ProtocolError::WrongCodeLength { len: bytes.len() });
    }

    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Digits only: no sign, no whitespace.
fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(reader: &mut ProtocolReader, text: &str) -> Vec<Result<Option<Message>, ProtocolError>> {
        text.lines().map(|line| reader.read_line(line)).collect()
    }

    fn messages(reader: &mut ProtocolReader, text: &str) -> Vec<Message> {
        feed(reader, text)
            .into_iter()
            .filter_map(|r| r.ok().flatten())
            .collect()
    }

    fn reply(command: &str, success: bool, data: &[&str]) -> Message {
        Message::Reply(CommandReply {
            command: command.to_string(),
            success,
            data: data.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_version_reply_with_data() {
        let mut reader = ProtocolReader::new();
        let out = messages(&mut reader, "BEGIN\nVERSION\nSUCCESS\nDATA\n1\n0.10.2\nEND\n");
        assert_eq!(out, vec![reply("VERSION", true, &["0.10.2"])]);
        assert_eq!(reader.state(), ParserState::Idle);
    }

    #[test]
    fn test_error_reply_without_data() {
        let mut reader = ProtocolReader::new();
        let out = messages(&mut reader, "BEGIN\nLIST DenonTuner\nERROR\nEND\n");
        assert_eq!(out, vec![reply("LIST DenonTuner", false, &[])]);
    }

    #[test]
    fn test_reply_without_status_payload() {
        let mut reader = ProtocolReader::new();
        let out = messages(&mut reader, "BEGIN\nSIGHUP\nEND\n");
        assert_eq!(out, vec![reply("SIGHUP", true, &[])]);
    }

    #[test]
    fn test_error_reply_keeps_data() {
        let mut reader = ProtocolReader::new();
        let out = messages(
            &mut reader,
            "BEGIN\nSEND_ONCE tv KEY_FOO\nERROR\nDATA\n1\nunknown command: \"KEY_FOO\"\nEND\n",
        );
        assert_eq!(
            out,
            vec![reply("SEND_ONCE tv KEY_FOO", false, &["unknown command: \"KEY_FOO\""])]
        );
    }

    #[test]
    fn test_multi_line_data_keeps_order_and_end_like_lines() {
        let mut reader = ProtocolReader::new();
        let out = messages(
            &mut reader,
            "BEGIN\nLIST\nSUCCESS\nDATA\n3\nDenonTuner\nEND\nTelevision\nEND\n",
        );
        assert_eq!(
            out,
            vec![reply("LIST", true, &["DenonTuner", "END", "Television"])]
        );
    }

    #[test]
    fn test_zero_length_data() {
        let mut reader = ProtocolReader::new();
        let out = messages(&mut reader, "BEGIN\nLIST\nSUCCESS\nDATA\n0\nEND\n");
        assert_eq!(out, vec![reply("LIST", true, &[])]);
    }

    #[test]
    fn test_data_progress_is_tracked() {
        let mut reader = ProtocolReader::new();
        feed(&mut reader, "BEGIN\nLIST\nSUCCESS\nDATA\n2\nfirst\n");
        assert_eq!(reader.state(), ParserState::DataCollect);
        assert_eq!(reader.declared_len(), 2);
        assert_eq!(reader.consumed_len(), 1);
        reader.read_line("second").unwrap();
        assert_eq!(reader.state(), ParserState::DataEnd);
    }

    #[test]
    fn test_event_line() {
        let mut reader = ProtocolReader::new();
        let out = reader
            .read_line("000000000000002a 0 KEY_POWER Television")
            .unwrap();
        assert_eq!(
            out,
            Some(Message::Event(ButtonPress {
                code: 0,
                repeat_count: 0,
                button_name: "KEY_POWER".to_string(),
                remote_control_name: "Television".to_string(),
            }))
        );
    }

    #[test]
    fn test_event_fields_round_trip() {
        let cases = [
            ("0000000000f40bf0", 0, "KEY_UP", "Samsung"),
            ("0000000000f40bf0", 17, "KEY_UP", "Samsung"),
            ("1234", 3, "KEY_1", "remote-2"),
            ("ffff000000000000", 4294967295, "BTN", "r"),
        ];
        for (code, repeat, button, remote) in cases {
            let line = format!("{code} {repeat} {button} {remote}");
            let event = parse_button_press(&line).unwrap();
            assert_eq!(event.repeat_count, repeat);
            assert_eq!(event.button_name, button);
            assert_eq!(event.remote_control_name, remote);
        }
    }

    #[test]
    fn test_code_is_little_endian_of_first_two_bytes() {
        assert_eq!(decode_code("0102000000000000").unwrap(), 0x0201);
        assert_eq!(decode_code("ff00000000000000").unwrap(), 0x00ff);
        assert_eq!(decode_code("ABCD000000000000").unwrap(), 0xcdab);
        // Short codes are padded on the left, so their digits land in the low bytes.
        assert_eq!(decode_code("2a").unwrap(), 0);
        assert_eq!(decode_code("1234567890abcd").unwrap(), 0x1200);
    }

    #[test]
    fn test_bad_codes() {
        assert_eq!(
            decode_code("00000000000000zz"),
            Err(ProtocolError::InvalidHexCode {
                code: "00000000000000zz".to_string()
            })
        );
        assert_eq!(
            decode_code("+1"),
            Err(ProtocolError::InvalidHexCode {
                code: "+1".to_string()
            })
        );
        assert_eq!(
            decode_code("000000000000000000"),
            Err(ProtocolError::WrongCodeLength { len: 9 })
        );
        assert!(matches!(
            decode_code("00000000000000000"),
            Err(ProtocolError::InvalidHexCode { .. })
        ));
        for code in ["00000000000000+f", "0000000000000-10", "000000000000000\u{e9}", "\u{e9}\u{e9}"] {
            assert_eq!(
                decode_code(code),
                Err(ProtocolError::InvalidHexCode {
                    code: code.to_string()
                })
            );
        }
    }

    #[test]
    fn test_bad_repeat_counts() {
        for repeat in ["-1", "x", "+2", "99999999999"] {
            let line = format!("000000000000002a {repeat} KEY_POWER Television");
            assert_eq!(
                parse_button_press(&line),
                Err(ProtocolError::InvalidRepeatCount {
                    repeat: repeat.to_string()
                })
            );
        }
    }

    #[test]
    fn test_malformed_event_shapes() {
        assert_eq!(
            parse_button_press(""),
            Err(ProtocolError::MalformedEvent {
                line: String::new(),
                fields: 0
            })
        );
        assert!(matches!(
            parse_button_press("000000000000002a 0 KEY_POWER"),
            Err(ProtocolError::MalformedEvent { fields: 3, .. })
        ));
        assert!(matches!(
            parse_button_press("000000000000002a 0 KEY_POWER Television extra"),
            Err(ProtocolError::MalformedEvent { fields: 5, .. })
        ));
    }

    #[test]
    fn test_invalid_status_resets() {
        let mut reader = ProtocolReader::new();
        let results = feed(&mut reader, "BEGIN\nVERSION\nMAYBE\n");
        assert_eq!(
            results[2],
            Err(ProtocolError::InvalidStatus {
                line: "MAYBE".to_string()
            })
        );
        assert_eq!(reader.state(), ParserState::Idle);
    }

    #[test]
    fn test_invalid_data_start_and_length_reset() {
        let mut reader = ProtocolReader::new();
        let results = feed(&mut reader, "BEGIN\nLIST\nSUCCESS\nPAYLOAD\n");
        assert!(matches!(results[3], Err(ProtocolError::InvalidDataStart { .. })));
        assert_eq!(reader.state(), ParserState::Idle);

        let results = feed(&mut reader, "BEGIN\nLIST\nSUCCESS\nDATA\n-3\n");
        assert!(matches!(results[4], Err(ProtocolError::InvalidDataLength { .. })));
        assert_eq!(reader.state(), ParserState::Idle);
    }

    #[test]
    fn test_missing_end_discards_reply() {
        let mut reader = ProtocolReader::new();
        let results = feed(&mut reader, "BEGIN\nLIST\nSUCCESS\nDATA\n1\nremote\nextra\n");
        assert_eq!(
            results[6],
            Err(ProtocolError::MissingDataEnd {
                line: "extra".to_string(),
                declared: 1
            })
        );
        assert!(results.iter().all(|r| !matches!(r, Ok(Some(_)))));
        assert_eq!(reader.state(), ParserState::Idle);
    }

    #[test]
    fn test_recovers_after_malformed_lines() {
        let mut reader = ProtocolReader::new();
        let out = messages(
            &mut reader,
            "garbage\n\
             zz 0 KEY_POWER Television\n\
             BEGIN\nVERSION\nBOGUS\n\
             000000000000002a 1 KEY_POWER Television\n\
             BEGIN\nVERSION\nSUCCESS\nDATA\nnope\n\
             BEGIN\nVERSION\nSUCCESS\nDATA\n1\n0.10.2\nEND\n",
        );
        assert_eq!(
            out,
            vec![
                Message::Event(ButtonPress {
                    code: 0,
                    repeat_count: 1,
                    button_name: "KEY_POWER".to_string(),
                    remote_control_name: "Television".to_string(),
                }),
                reply("VERSION", true, &["0.10.2"]),
            ]
        );
    }

    #[test]
    fn test_begin_starts_fresh_transaction() {
        let mut reader = ProtocolReader::new();
        feed(&mut reader, "BEGIN\nLIST\nERROR\nDATA\n1\nstale\nnot-end\n");
        let out = messages(&mut reader, "BEGIN\nVERSION\nSUCCESS\nEND\n");
        assert_eq!(out, vec![reply("VERSION", true, &[])]);
    }

    #[test]
    fn test_parser_state_display() {
        assert_eq!(ParserState::DataCollect.to_string(), "data-collect");
        assert_eq!(ParserState::default(), ParserState::Idle);
    }
}
