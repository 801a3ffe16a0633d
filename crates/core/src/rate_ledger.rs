use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;

/// Append-only plain-text exchange-rate log.
///
/// One observation per line, `YYYY-MM-DD HH:MM:SS CODE=RATE`. A legacy
/// pipe-delimited form (`YYYY-MM-DD|HH:MM:SS|CODE=RATE`) is still accepted on
/// read. Lines that do not carry the full date+time+code=rate triple are
/// skipped silently and never rewritten; history is only ever appended to.
pub struct RateLedger {
    path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("could not read rate ledger `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not append to rate ledger `{path}`: {source}")]
    Append { path: PathBuf, source: std::io::Error },
}

impl RateLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-currency rate in effect today: the entry with the latest time
    /// stamped with the local calendar date. Yesterday's observations never
    /// carry forward.
    pub fn load_today_rates(&self) -> Result<HashMap<String, Decimal>, LedgerError> {
        self.load_rates_on(Local::now().date_naive())
    }

    pub fn load_rates_on(&self, date: NaiveDate) -> Result<HashMap<String, Decimal>, LedgerError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(source) => return Err(LedgerError::Read { path: self.path.clone(), source }),
        };

        let mut latest: HashMap<String, (NaiveTime, Decimal)> = HashMap::new();
        for line in text.lines() {
            let Some(entry) = parse_line(line) else { continue };
            if entry.date != date {
                continue;
            }
            match latest.get(&entry.code) {
                Some((time, _)) if *time > entry.time => {}
                _ => {
                    latest.insert(entry.code, (entry.time, entry.rate));
                }
            }
        }

        Ok(latest.into_iter().map(|(code, (_, rate))| (code, rate)).collect())
    }

    /// Append one line per positive rate, stamped now. Prior lines are never
    /// touched.
    pub fn append_rates(&self, rates: &HashMap<String, Decimal>) -> Result<(), LedgerError> {
        self.append_rates_at(rates, Local::now().naive_local())
    }

    fn append_rates_at(
        &self,
        rates: &HashMap<String, Decimal>,
        stamp: NaiveDateTime,
    ) -> Result<(), LedgerError> {
        let mut entries: Vec<(&String, &Decimal)> =
            rates.iter().filter(|(_, rate)| **rate > Decimal::ZERO).collect();
        if entries.is_empty() {
            return Ok(());
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LedgerError::Append { path: self.path.clone(), source })?;

        for (code, rate) in entries {
            writeln!(file, "{} {}={}", stamp.format("%Y-%m-%d %H:%M:%S"), code, rate)
                .map_err(|source| LedgerError::Append { path: self.path.clone(), source })?;
        }
        Ok(())
    }
}

struct ParsedLine {
    date: NaiveDate,
    time: NaiveTime,
    code: String,
    rate: Decimal,
}

fn parse_line(line: &str) -> Option<ParsedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = if line.contains('|') { line.splitn(3, '|') } else { line.splitn(3, ' ') };
    let date = NaiveDate::parse_from_str(parts.next()?.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(parts.next()?.trim(), "%H:%M:%S").ok()?;
    let (code, rate_text) = parts.next()?.trim().split_once('=')?;

    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    let rate = rate_text.trim().parse::<Decimal>().ok()?;

    Some(ParsedLine { date, time, code: code.to_string(), rate })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{parse_line, RateLedger};

    fn ledger_with(content: &str) -> (tempfile::TempDir, RateLedger) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tasas.txt");
        fs::write(&path, content).expect("seed ledger");
        (dir, RateLedger::new(path))
    }

    #[test]
    fn keeps_only_entries_for_the_requested_day() {
        let (_dir, ledger) = ledger_with(
            "2026-08-05 09:00:00 VES=36.10\n\
             2026-08-06 09:00:00 VES=36.55\n",
        );
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).expect("date");
        let rates = ledger.load_rates_on(date).expect("load");

        assert_eq!(rates.get("VES"), Some(&Decimal::new(36_55, 2)));
        assert_eq!(rates.len(), 1);

        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 5).expect("date");
        let stale = ledger.load_rates_on(yesterday).expect("load");
        assert_eq!(stale.get("VES"), Some(&Decimal::new(36_10, 2)));
    }

    #[test]
    fn latest_time_wins_for_duplicate_currency_and_day() {
        let (_dir, ledger) = ledger_with(
            "2026-08-06 09:00:00 VES=36.10\n\
             2026-08-06 15:30:00 VES=36.90\n\
             2026-08-06 12:00:00 VES=36.40\n",
        );
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).expect("date");
        let rates = ledger.load_rates_on(date).expect("load");

        assert_eq!(rates.get("VES"), Some(&Decimal::new(36_90, 2)));
    }

    #[test]
    fn accepts_legacy_pipe_delimited_lines() {
        let (_dir, ledger) = ledger_with("2026-08-06|08:15:00|COP=4100.25\n");
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).expect("date");
        let rates = ledger.load_rates_on(date).expect("load");

        assert_eq!(rates.get("COP"), Some(&Decimal::new(4_100_25, 2)));
    }

    #[test]
    fn skips_malformed_and_timestampless_lines() {
        let (_dir, ledger) = ledger_with(
            "2026-08-06 VES=36.55\n\
             no date here\n\
             2026-08-06 10:00:00 VES\n\
             2026-08-06 10:00:00 =36.55\n\
             2026-08-06 10:00:00 VES=abc\n\
             2026-08-06 10:00:00 EUR=1.09\n",
        );
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).expect("date");
        let rates = ledger.load_rates_on(date).expect("load");

        assert_eq!(rates.len(), 1);
        assert_eq!(rates.get("EUR"), Some(&Decimal::new(109, 2)));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = RateLedger::new(dir.path().join("absent.txt"));
        let rates = ledger.load_today_rates().expect("load");
        assert!(rates.is_empty());
    }

    #[test]
    fn append_adds_lines_without_rewriting_history() {
        let (_dir, ledger) = ledger_with("2026-08-05 09:00:00 VES=36.10\n");
        let mut rates = HashMap::new();
        rates.insert("VES".to_string(), Decimal::new(36_55, 2));
        rates.insert("EUR".to_string(), Decimal::new(109, 2));
        rates.insert("XXX".to_string(), Decimal::ZERO);
        ledger.append_rates(&rates).expect("append");

        let content = fs::read_to_string(ledger.path()).expect("read back");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "2026-08-05 09:00:00 VES=36.10");
        assert_eq!(lines.len(), 3, "one line per positive rate, none rewritten");
        assert!(lines[1].ends_with("EUR=1.09"));
        assert!(lines[2].ends_with("VES=36.55"));

        let roundtrip = ledger.load_today_rates().expect("load");
        assert_eq!(roundtrip.get("VES"), Some(&Decimal::new(36_55, 2)));
        assert_eq!(roundtrip.get("EUR"), Some(&Decimal::new(109, 2)));
        assert!(!roundtrip.contains_key("XXX"));
    }

    #[test]
    fn parse_line_requires_the_full_triple() {
        assert!(parse_line("2026-08-06 10:00:00 VES=36.5").is_some());
        assert!(parse_line("2026-08-06|10:00:00|VES=36.5").is_some());
        assert!(parse_line("2026-08-06 VES=36.5").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("VES=36.5").is_none());
    }
}
