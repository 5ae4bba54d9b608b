use crate::errors::*;
use error_chain::bail;
use regex::Regex;
use std::io::BufRead;

/// Dimacs formula.
#[derive(Debug, PartialEq)]
pub struct Dimacs {
    /// Number of variables declared in the problem line.
    pub n_vars: usize,
    /// Clauses, as signed integer literals without the terminating `0`.
    pub clauses: Vec<Vec<i32>>,
}

/// Parse dimacs from buffer reader.
///
/// A clause ends at its `0` terminator and may span several lines. Reading
/// stops after the number of clauses declared in the problem line, or at a
/// `%` line as found in SATLIB benchmarks.
pub fn parse_dimacs_from_buf_reader<F>(reader: &mut F) -> Result<Dimacs>
where
    F: std::io::BufRead,
{
    let re_cnf = Regex::new(r"^p\s+cnf\s+(\d+)\s+(\d+)\s*$").unwrap();
    let re_clause = Regex::new(r"^(\s*-?\d+)+\s*$").unwrap();
    let re_lit = Regex::new(r"(-?\d+)").unwrap();

    let mut n_clauses = None;
    let mut n_vars = 0usize;
    let mut clauses = vec![];
    let mut cl = vec![];

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        } else if line.starts_with('%') {
            break;
        } else if line.starts_with('p') {
            let cap = re_cnf
                .captures(line)
                .ok_or_else(|| ErrorKind::MalformedDimacs(line.to_string()))?;
            n_vars = cap[1].parse()?;
            n_clauses = Some(cap[2].parse::<usize>()?);
        } else if re_clause.is_match(line) {
            for cap in re_lit.captures_iter(line) {
                match cap[1].parse::<i32>()? {
                    0 => clauses.push(std::mem::take(&mut cl)),
                    l => cl.push(l),
                }
            }
            if Some(clauses.len()) == n_clauses {
                break;
            }
        } else {
            bail!(ErrorKind::MalformedDimacs(line.to_string()));
        }
    }

    // Last clause without its terminator
    if !cl.is_empty() {
        clauses.push(cl);
    }

    Ok(Dimacs { n_vars, clauses })
}

impl Dimacs {
    /// Converts to DIMACS text, one clause per line.
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.n_vars, self.clauses.len());
        for clause in &self.clauses {
            for lit in clause {
                out.push_str(&format!("{} ", lit));
            }
            out.push_str("0\n");
        }
        out
    }
}
