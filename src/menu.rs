//! Interactive text-menu driver.
//!
//! A numbered console menu over the book: create, amend, cancel, show,
//! exit. Malformed input re-prompts; end of input ends the session.

use std::io::{self, BufRead, Write};

use crate::book::Book;
use crate::order::{LimitOrder, Side, TimeInForce, Trade};

/// Run the interactive session on stdin/stdout.
pub fn run(book: &mut Book) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    match session(book, &mut stdin.lock(), &mut stdout.lock()) {
        // End of input is a normal way to leave the menu
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
        other => other,
    }
}

fn session(book: &mut Book, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Order book console")?;

    loop {
        writeln!(out)?;
        writeln!(out, "1. Create an order")?;
        writeln!(out, "2. Amend an existing order")?;
        writeln!(out, "3. Cancel an order")?;
        writeln!(out, "4. Show the book")?;
        writeln!(out, "5. Exit")?;
        write!(out, "Choose an option (1-5): ")?;
        out.flush()?;

        match read_trimmed(input)?.as_str() {
            "1" => create(book, input, out)?,
            "2" => amend(book, input, out)?,
            "3" => cancel(book, input, out)?,
            "4" => show(book, out)?,
            "5" => break,
            _ => writeln!(out, "Invalid choice, try again.")?,
        }
    }
    Ok(())
}

fn read_trimmed(input: &mut dyn BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(line.trim().to_owned())
}

/// Prompt until the answer parses.
fn ask<T: std::str::FromStr>(
    label: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<T> {
    loop {
        write!(out, "{label}: ")?;
        out.flush()?;
        match read_trimmed(input)?.parse() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(out, "Invalid value, try again.")?,
        }
    }
}

fn ask_side(input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<Side> {
    let choice: u32 = ask("Order side (1 for BUY, 2 for SELL)", input, out)?;
    Ok(if choice == 1 { Side::Bid } else { Side::Ask })
}

fn ask_tif(input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<TimeInForce> {
    let choice: u32 = ask("Time-in-force (1 for GTC, 2 for FOK)", input, out)?;
    Ok(if choice == 1 {
        TimeInForce::Gtc
    } else {
        TimeInForce::Fok
    })
}

fn print_trades(trades: &[Trade], out: &mut dyn Write) -> io::Result<()> {
    if trades.is_empty() {
        return Ok(());
    }
    writeln!(out, "Generated {} trade(s):", trades.len())?;
    for trade in trades {
        writeln!(
            out,
            "  Trade: Bid Order {} @ {} x {} vs Ask Order {} @ {} x {}",
            trade.bid.order_id,
            trade.bid.price,
            trade.bid.qty,
            trade.ask.order_id,
            trade.ask.price,
            trade.ask.qty,
        )?;
    }
    Ok(())
}

fn create(book: &mut Book, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "--- Create New Order ---")?;
    let id = ask("Order ID", input, out)?;
    let side = ask_side(input, out)?;
    let tif = ask_tif(input, out)?;
    let price = ask("Price", input, out)?;
    let qty = ask("Quantity", input, out)?;

    let trades = book.submit(LimitOrder {
        id,
        side,
        tif,
        price,
        qty,
    });
    writeln!(out, "Order processed.")?;
    print_trades(&trades, out)
}

fn amend(book: &mut Book, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "--- Amend Existing Order ---")?;
    let id = ask("Order ID to amend", input, out)?;
    let side = ask_side(input, out)?;
    let price = ask("New price", input, out)?;
    let qty = ask("New quantity", input, out)?;

    let trades = book.amend(id, side, price, qty);
    writeln!(out, "Amend processed.")?;
    print_trades(&trades, out)
}

fn cancel(book: &mut Book, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "--- Cancel Order ---")?;
    let id = ask("Order ID to cancel", input, out)?;
    book.cancel(id);
    writeln!(out, "Cancellation processed.")
}

fn show(book: &Book, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "--- Book Status ---")?;
    writeln!(out, "Resting orders: {}", book.size())?;

    let snapshot = book.snapshot();
    writeln!(out, "Asks (best last):")?;
    for level in snapshot.asks.iter().rev() {
        writeln!(out, "  {:>8} x {}", level.price, level.qty)?;
    }
    writeln!(out, "Bids (best first):")?;
    for level in &snapshot.bids {
        writeln!(out, "  {:>8} x {}", level.price, level.qty)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drive(book: &mut Book, script: &str) -> String {
        let mut input = Cursor::new(script.to_owned());
        let mut output = Vec::new();
        session(book, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_create_and_show() {
        let mut book = Book::new();
        let out = drive(
            &mut book,
            "1\n1\n1\n1\n100\n10\n\
             4\n\
             5\n",
        );

        assert_eq!(book.size(), 1);
        assert_eq!(book.best_bid(), Some(100));
        assert!(out.contains("Resting orders: 1"));
        assert!(out.contains("100 x 10"));
    }

    #[test]
    fn test_crossing_create_prints_trade() {
        let mut book = Book::new();
        book.submit(LimitOrder::gtc(1, Side::Bid, 100, 10));

        let out = drive(&mut book, "1\n2\n2\n1\n100\n10\n5\n");

        assert!(book.is_empty());
        assert!(out.contains("Generated 1 trade(s):"));
        assert!(out.contains("Bid Order 1 @ 100 x 10 vs Ask Order 2 @ 100 x 10"));
    }

    #[test]
    fn test_cancel_flow() {
        let mut book = Book::new();
        book.submit(LimitOrder::gtc(9, Side::Ask, 105, 3));

        drive(&mut book, "3\n9\n5\n");
        assert!(book.is_empty());
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let mut book = Book::new();
        let out = drive(&mut book, "bogus\n1\nnot-a-number\n7\n1\n1\n100\n5\n5\n");

        assert!(out.contains("Invalid choice, try again."));
        assert!(out.contains("Invalid value, try again."));
        assert_eq!(book.size(), 1);
        assert!(book.contains(7));
    }

    #[test]
    fn test_eof_ends_session() {
        let mut book = Book::new();
        let mut input = Cursor::new(String::from("1\n42\n"));
        let mut output = Vec::new();
        let err = session(&mut book, &mut input, &mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
