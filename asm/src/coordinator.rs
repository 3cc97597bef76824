//! Single-pass assembly.
//!
//! Each classified line becomes one task. Symbol loads wait on their handle,
//! labels bind their name, everything else is ready at once. Once the whole
//! source has been scanned the label tasks are joined, the leftover pending
//! symbols become variables, and the remaining tasks are joined in spawn
//! order so the output follows the source no matter which task finished
//! first.

use crate::{
    encoder,
    error::Error,
    parser::{Record, Stmt},
    symbols::SymbolTable,
};
use hack_arch::Inst;
use std::{collections::VecDeque, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// One emitted instruction word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub pc: u16,
    pub line: usize,
    pub inst: Inst,
}

impl Word {
    pub fn to_bin_string(&self) -> String {
        self.inst.to_bin_string()
    }
}

#[derive(Debug, Clone)]
pub struct Assembled {
    pub words: Vec<Word>,
    /// Labels and variables in first-use order.
    pub symbols: Vec<(String, u16)>,
}

impl Assembled {
    pub fn bin_strings(&self) -> Vec<String> {
        self.words.iter().map(Word::to_bin_string).collect()
    }
}

// ----------------------------------------------------------------------------
// Coordinator

/// Spawns resolution units on the current tokio runtime. Dropping it aborts
/// every unit that has not been drained yet.
pub struct Coordinator {
    symbols: Arc<SymbolTable>,
    pc: u16,
    labels: VecDeque<(usize, JoinHandle<Result<(), Error>>)>,
    units: VecDeque<(usize, JoinHandle<Result<Record, Error>>)>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::with_symbols(SymbolTable::new())
    }

    pub fn with_symbols(symbols: SymbolTable) -> Self {
        Coordinator {
            symbols: Arc::new(symbols),
            pc: 0,
            labels: VecDeque::new(),
            units: VecDeque::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Classify one source line and spawn its unit.
    pub async fn push_line(&mut self, line: usize, raw: &str) -> Result<(), Error> {
        let stmt = Stmt::parse(raw).map_err(|e| e.at(line))?;
        self.push(line, stmt).await
    }

    /// Place a statement at the current address and spawn its unit.
    ///
    /// Units are spawned with `tokio::spawn`, so this only runs inside a
    /// tokio runtime.
    pub async fn push(&mut self, line: usize, stmt: Stmt) -> Result<(), Error> {
        if matches!(stmt, Stmt::NoOp) {
            return Ok(());
        }
        let record = Record {
            pc: self.pc,
            line,
            stmt,
        };
        if record.stmt.is_inst() {
            self.pc = self
                .pc
                .checked_add(1)
                .ok_or(Error::ProgramSize(self.pc))
                .map_err(|e| e.at(line))?;
        }
        self.spawn(record);
        Ok(())
    }

    fn spawn(&mut self, record: Record) {
        let line = record.line;
        trace!(line, pc = record.pc, stmt = ?record.stmt, "spawn unit");
        match &record.stmt {
            Stmt::Label(name) => {
                // Reserve the entry so first-use order follows the source.
                self.symbols.reserve(name);
                let symbols = self.symbols.clone();
                let name = name.clone();
                let pc = record.pc;
                let task = tokio::spawn(async move { symbols.define(&name, pc) });
                self.labels.push_back((line, task));
            }
            Stmt::LoadSymbol(name) => {
                // Resolve now so pending entries are created in source order.
                let handle = self.symbols.resolve(name);
                let task = tokio::spawn(async move {
                    let value = handle.value().await?;
                    Ok(Record {
                        stmt: Stmt::LoadConstant(value as u32),
                        ..record
                    })
                });
                self.units.push_back((line, task));
            }
            Stmt::LoadConstant(_) | Stmt::Compute { .. } => {
                let task = tokio::spawn(async move { Ok(record) });
                self.units.push_back((line, task));
            }
            Stmt::NoOp => {}
        }
    }

    /// Bind every label, allocate variables, then encode in source order.
    pub async fn finish(mut self) -> Result<Assembled, Error> {
        while let Some((line, task)) = self.labels.pop_front() {
            join(line, task).await?;
        }

        let allocated = self.symbols.allocate_pending_variables()?;
        debug!(variables = allocated.len(), "variables allocated");

        let mut words = Vec::with_capacity(self.units.len());
        while let Some((line, task)) = self.units.pop_front() {
            let record = join(line, task).await?;
            if let Some(inst) = encoder::encode(&record.stmt).map_err(|e| e.at(line))? {
                words.push(Word {
                    pc: record.pc,
                    line,
                    inst,
                });
            }
        }

        let symbols = self
            .symbols
            .symbols()
            .into_iter()
            .filter_map(|(name, val)| val.map(|val| (name, val)))
            .collect();
        Ok(Assembled { words, symbols })
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        let outstanding = self.labels.len() + self.units.len();
        if outstanding > 0 {
            debug!(outstanding, "aborting resolution units");
        }
        for (_, task) in &self.labels {
            task.abort();
        }
        for (_, task) in &self.units {
            task.abort();
        }
    }
}

async fn join<T>(line: usize, task: JoinHandle<Result<T, Error>>) -> Result<T, Error> {
    match task.await {
        Ok(result) => result.map_err(|e| e.at(line)),
        Err(e) => Err(Error::from(e).at(line)),
    }
}

/// Assemble a whole program, one string per source line.
pub async fn assemble<I, S>(lines: I) -> Result<Assembled, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut coordinator = Coordinator::new();
    for (idx, raw) in lines.into_iter().enumerate() {
        coordinator.push_line(idx, raw.as_ref()).await?;
    }
    coordinator.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;
    use std::time::Duration;

    async fn bins(src: &str) -> Vec<String> {
        assemble(src.lines()).await.unwrap().bin_strings()
    }

    #[tokio::test]
    async fn constants_and_compute() {
        assert_eq!(
            bins("@2\nD=A\n@3\nD=D+A").await,
            vec![
                "1000000000000010",
                "1110110000010000",
                "1000000000000011",
                "1110000010010000",
            ]
        );
    }

    #[tokio::test]
    async fn forward_label() {
        assert_eq!(bins("@LOOP\n(LOOP)").await, vec!["1000000000000001"]);
    }

    #[tokio::test]
    async fn backward_label() {
        assert_eq!(
            bins("(TOP)\n@TOP\n0;JMP").await,
            vec!["1000000000000000", "1110101010000111"]
        );
    }

    #[tokio::test]
    async fn variables() {
        assert_eq!(bins("@foo").await, vec!["1000000000010000"]);
        let assembled = assemble(["@foo", "@bar", "@foo", "@baz"]).await.unwrap();
        let addrs: Vec<_> = assembled.words.iter().map(|w| w.inst).collect();
        assert_eq!(
            addrs,
            vec![Inst::A(16), Inst::A(17), Inst::A(16), Inst::A(18)]
        );
        assert_eq!(
            assembled.symbols,
            vec![
                ("foo".to_string(), 16),
                ("bar".to_string(), 17),
                ("baz".to_string(), 18),
            ]
        );
    }

    #[tokio::test]
    async fn label_beats_variable() {
        // `x` is referenced before it is declared as a label.
        let assembled = assemble(["@x", "@y", "(x)", "D=M"]).await.unwrap();
        let insts: Vec<_> = assembled.words.iter().map(|w| w.inst).collect();
        assert_eq!(insts[0], Inst::A(2));
        assert_eq!(insts[1], Inst::A(16));
    }

    #[tokio::test]
    async fn program_counters() {
        let assembled = assemble(["// header", "(A)", "@1", "", "(B)", "(C)", "D=A", "@C"])
            .await
            .unwrap();
        let positions: Vec<_> = assembled.words.iter().map(|w| (w.pc, w.line)).collect();
        assert_eq!(positions, vec![(0, 2), (1, 6), (2, 7)]);
        assert_eq!(
            assembled.symbols,
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("C".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_label() {
        let err = assemble(["(X)", "@0", "(X)"]).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            Error::DuplicateSymbol { existing: 0, attempted: 1, .. }
                | Error::DuplicateSymbol { existing: 1, attempted: 0, .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_label_same_value() {
        let err = assemble(["(X)", "(X)", "@X"]).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            Error::DuplicateSymbol { existing: 0, attempted: 0, .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_predefined() {
        let err = assemble(["(SCREEN)", "0"]).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            Error::DuplicateSymbol { existing: 16384, attempted: 0, .. }
        ));
        assert_eq!(err.line(), Some(0));
    }

    #[tokio::test]
    async fn errors_carry_lines() {
        let err = assemble(["@1", "D=A", "D=Q"]).await.unwrap_err();
        assert!(matches!(err.kind(), Error::Parse(_)));
        assert_eq!(err.line(), Some(2));

        let err = assemble(["@1", "D=A+D"]).await.unwrap_err();
        assert!(matches!(err.kind(), Error::UnresolvedOperand(_)));
        assert_eq!(err.line(), Some(1));

        let err = assemble(["@32768"]).await.unwrap_err();
        assert!(matches!(err.kind(), Error::Range(_)));
        assert_eq!(err.line(), Some(0));
    }

    /// Wait until nothing holds the table any more.
    async fn released(table: Weak<SymbolTable>) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while table.strong_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn parse_error_aborts_waiting_units() {
        let mut coordinator = Coordinator::new();
        coordinator.push_line(0, "@later").await.unwrap();
        coordinator.push_line(1, "(here)").await.unwrap();
        let table = Arc::downgrade(&coordinator.symbols);
        let waiter = coordinator.symbols().resolve("later");

        let err = coordinator.push_line(2, "???").await.unwrap_err();
        assert!(matches!(err.kind(), Error::Parse(_)));
        drop(coordinator);

        released(table).await;
        match waiter.value().await {
            Err(Error::Unresolved(name)) => assert_eq!(name, "later"),
            other => panic!("waiter should fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn encode_error_aborts_remaining_units() {
        let mut coordinator = Coordinator::new();
        for (line, raw) in ["@40000", "@x", "(y)", "@y"].into_iter().enumerate() {
            coordinator.push_line(line, raw).await.unwrap();
        }
        let table = Arc::downgrade(&coordinator.symbols);

        let err = coordinator.finish().await.unwrap_err();
        assert!(matches!(err.kind(), Error::Range(_)));
        assert_eq!(err.line(), Some(0));
        released(table).await;

        let err = assemble(["@40000", "@x", "(y)"]).await.unwrap_err();
        assert!(matches!(err.kind(), Error::Range(_)));
    }

    #[tokio::test]
    async fn program_counter_overflow() {
        let mut coordinator = Coordinator::new();
        coordinator.pc = u16::MAX;
        let err = coordinator.push_line(9, "D=A").await.unwrap_err();
        assert!(matches!(err.kind(), Error::ProgramSize(u16::MAX)));
        assert_eq!(err.line(), Some(9));

        // Labels take no address, so they still fit.
        coordinator.push_line(10, "(END)").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn drain_order_ignores_completion_order() {
        let mut coordinator = Coordinator::new();
        let names: Vec<String> = (0..32).map(|n| format!("sym{n}")).collect();
        for (line, name) in names.iter().enumerate() {
            coordinator
                .push(line, Stmt::LoadSymbol(name.clone()))
                .await
                .unwrap();
        }

        // Resolve back to front with pauses so units complete in reverse.
        for (n, name) in names.iter().enumerate().rev() {
            coordinator.symbols().define(name, 1000 + n as u16).unwrap();
            tokio::time::sleep(Duration::from_micros(200)).await;
        }

        let assembled = coordinator.finish().await.unwrap();
        let insts: Vec<_> = assembled.words.iter().map(|w| w.inst).collect();
        let expected: Vec<_> = (0..32).map(|n| Inst::A(1000 + n)).collect();
        assert_eq!(insts, expected);
    }
}
