//! CSV batch driver.
//!
//! Line-oriented command format, one book operation per record:
//!
//! ```text
//! CREATE,<oid>,<BUY|SELL>,<GTC|FOK>,<price>,<quantity>
//! MODIFY,<oid>,<BUY|SELL>,<GTC|FOK>,<price>,<quantity>
//! CANCEL,<oid>
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A malformed line
//! is reported and skipped; processing always continues to the end of
//! the file.

use std::fs::File;
use std::io::{self, BufReader};
use std::num::ParseIntError;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::warn;

use crate::book::Book;
use crate::order::{LimitOrder, OrderId, Price, Qty, Side, TimeInForce};

/// One parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit a new order
    Create(LimitOrder),
    /// Replace a resting order (its original time-in-force is preserved)
    Amend {
        id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    },
    /// Remove a resting order
    Cancel { id: OrderId },
}

/// Why a command line failed to parse.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid {what} `{value}`: {source}")]
    InvalidNumber {
        what: &'static str,
        value: String,
        source: ParseIntError,
    },

    #[error("invalid side `{0}`, expected BUY or SELL")]
    InvalidSide(String),

    #[error("invalid time-in-force `{0}`, expected GTC or FOK")]
    InvalidTimeInForce(String),
}

/// Result of one batch run.
#[derive(Clone, Copy, Debug, Default)]
pub struct BatchSummary {
    /// Command lines seen (malformed ones included)
    pub commands: u64,
    /// Trades executed across the whole file
    pub trades: u64,
    /// Orders resting when the file ended
    pub resting: usize,
}

fn field<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &'static str,
) -> Result<&'a str, CommandError> {
    record
        .get(idx)
        .filter(|value| !value.is_empty())
        .ok_or(CommandError::MissingField(name))
}

fn number<T>(value: &str, what: &'static str) -> Result<T, CommandError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value.parse().map_err(|source| CommandError::InvalidNumber {
        what,
        value: value.to_owned(),
        source,
    })
}

fn side(value: &str) -> Result<Side, CommandError> {
    match value {
        "BUY" => Ok(Side::Bid),
        "SELL" => Ok(Side::Ask),
        other => Err(CommandError::InvalidSide(other.to_owned())),
    }
}

fn time_in_force(value: &str) -> Result<TimeInForce, CommandError> {
    match value {
        "GTC" => Ok(TimeInForce::Gtc),
        "FOK" => Ok(TimeInForce::Fok),
        other => Err(CommandError::InvalidTimeInForce(other.to_owned())),
    }
}

/// Parse one CSV record into a [`Command`].
pub fn parse_record(record: &StringRecord) -> Result<Command, CommandError> {
    let action = field(record, 0, "action")?;
    let id: OrderId = number(field(record, 1, "order id")?, "order id")?;

    match action {
        "CREATE" => {
            let side = side(field(record, 2, "side")?)?;
            let tif = time_in_force(field(record, 3, "time-in-force")?)?;
            let price: Price = number(field(record, 4, "price")?, "price")?;
            let qty: Qty = number(field(record, 5, "quantity")?, "quantity")?;
            Ok(Command::Create(LimitOrder {
                id,
                side,
                tif,
                price,
                qty,
            }))
        }
        "MODIFY" => {
            let side = side(field(record, 2, "side")?)?;
            // The tif column is validated but not used: an amend keeps the
            // resting order's original time-in-force.
            time_in_force(field(record, 3, "time-in-force")?)?;
            let price: Price = number(field(record, 4, "price")?, "price")?;
            let qty: Qty = number(field(record, 5, "quantity")?, "quantity")?;
            Ok(Command::Amend {
                id,
                side,
                price,
                qty,
            })
        }
        "CANCEL" => Ok(Command::Cancel { id }),
        other => Err(CommandError::UnknownAction(other.to_owned())),
    }
}

/// Apply one command to the book, returning the number of trades it
/// produced.
pub fn apply(book: &mut Book, command: Command) -> usize {
    match command {
        Command::Create(order) => book.submit(order).len(),
        Command::Amend {
            id,
            side,
            price,
            qty,
        } => book.amend(id, side, price, qty).len(),
        Command::Cancel { id } => {
            book.cancel(id);
            0
        }
    }
}

/// Run a command file against the book.
///
/// Per-line problems are logged and skipped. The only hard error is a
/// file that cannot be opened.
pub fn run_file(path: &Path, book: &mut Book) -> io::Result<BatchSummary> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let mut summary = BatchSummary::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "skipping unreadable line");
                summary.commands += 1;
                continue;
            }
        };
        summary.commands += 1;
        let line = record.position().map_or(0, |pos| pos.line());

        match parse_record(&record) {
            Ok(command) => summary.trades += apply(book, command) as u64,
            Err(err) => warn!(line, %err, "skipping malformed line"),
        }
    }

    summary.resting = book.size();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_create() {
        let cmd = parse_record(&record(&["CREATE", "7", "BUY", "GTC", "100", "25"])).unwrap();
        match cmd {
            Command::Create(order) => {
                assert_eq!(order.id, 7);
                assert_eq!(order.side, Side::Bid);
                assert_eq!(order.tif, TimeInForce::Gtc);
                assert_eq!(order.price, 100);
                assert_eq!(order.qty, 25);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_fok_sell() {
        let cmd = parse_record(&record(&["CREATE", "8", "SELL", "FOK", "99", "1"])).unwrap();
        match cmd {
            Command::Create(order) => {
                assert_eq!(order.side, Side::Ask);
                assert_eq!(order.tif, TimeInForce::Fok);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_modify_drops_tif() {
        let cmd = parse_record(&record(&["MODIFY", "7", "SELL", "FOK", "101", "10"])).unwrap();
        assert_eq!(
            cmd,
            Command::Amend {
                id: 7,
                side: Side::Ask,
                price: 101,
                qty: 10
            }
        );
    }

    #[test]
    fn test_parse_cancel_needs_only_id() {
        let cmd = parse_record(&record(&["CANCEL", "42"])).unwrap();
        assert_eq!(cmd, Command::Cancel { id: 42 });
    }

    #[test]
    fn test_unknown_action() {
        let err = parse_record(&record(&["DELETE", "1"])).unwrap_err();
        assert!(matches!(err, CommandError::UnknownAction(_)));
    }

    #[test]
    fn test_missing_fields() {
        let err = parse_record(&record(&["CREATE", "1", "BUY", "GTC"])).unwrap_err();
        assert!(matches!(err, CommandError::MissingField("price")));

        let err = parse_record(&record(&["CANCEL"])).unwrap_err();
        assert!(matches!(err, CommandError::MissingField("order id")));
    }

    #[test]
    fn test_numeric_overflow_is_an_error() {
        let err =
            parse_record(&record(&["CANCEL", "99999999999999999999999999"])).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidNumber {
                what: "order id",
                ..
            }
        ));

        let err = parse_record(&record(&[
            "CREATE",
            "1",
            "BUY",
            "GTC",
            "3000000000", // beyond i32
            "10",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidNumber { what: "price", .. }
        ));
    }

    #[test]
    fn test_bad_side_and_tif_tokens() {
        let err = parse_record(&record(&["CREATE", "1", "LONG", "GTC", "100", "10"])).unwrap_err();
        assert!(matches!(err, CommandError::InvalidSide(_)));

        let err = parse_record(&record(&["CREATE", "1", "BUY", "IOC", "100", "10"])).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTimeInForce(_)));
    }

    #[test]
    fn test_apply_counts_trades() {
        let mut book = Book::new();
        assert_eq!(
            apply(
                &mut book,
                Command::Create(LimitOrder::gtc(1, Side::Bid, 100, 10))
            ),
            0
        );
        assert_eq!(
            apply(
                &mut book,
                Command::Create(LimitOrder::gtc(2, Side::Ask, 100, 10))
            ),
            1
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_run_file_skips_comments_and_bad_lines() {
        let path = std::env::temp_dir().join(format!("matchbook-batch-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "# warm the book\n\
             CREATE,1,BUY,GTC,100,10\n\
             \n\
             BOGUS,2\n\
             CREATE,2,SELL,GTC,100,4\n\
             CANCEL,999\n",
        )
        .unwrap();

        let mut book = Book::new();
        let summary = run_file(&path, &mut book).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(summary.commands, 4);
        assert_eq!(summary.trades, 1);
        assert_eq!(summary.resting, 1);
        assert_eq!(book.remaining_qty(1), Some(6));
    }

    #[test]
    fn test_run_file_missing_file_is_an_error() {
        let mut book = Book::new();
        let err = run_file(Path::new("/nonexistent/commands.csv"), &mut book);
        assert!(err.is_err());
    }
}
