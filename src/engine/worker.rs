use crate::config::AggregatorConfig;
use crate::error::AggregatorError;
use crate::orderbook::{AggregatedBook, LocalOrderUpdate, OrderBookError, QuoteStream, Snapshot};
use crate::types::{ExchangeId, Symbol};
use log::{debug, info};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

type DeltaReply = oneshot::Sender<Result<Option<QuoteStream>, OrderBookError>>;

/// Work item for a book worker
pub(crate) enum BookCommand {
    Snapshot {
        snapshot: Snapshot,
        reply: oneshot::Sender<()>,
    },
    QuoteStream {
        stream: QuoteStream,
        reply: DeltaReply,
    },
    LocalOrders {
        orders: Vec<LocalOrderUpdate>,
        reply: DeltaReply,
    },
    Read {
        reply: oneshot::Sender<Snapshot>,
    },
    Shutdown,
}

/// Channel sizes for a book worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub command_capacity: usize,
    pub delta_capacity: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            command_capacity: 1024,
            delta_capacity: 4096,
        }
    }
}

impl From<&AggregatorConfig> for WorkerSettings {
    fn from(config: &AggregatorConfig) -> Self {
        Self {
            command_capacity: config.command_capacity,
            delta_capacity: config.delta_capacity,
        }
    }
}

/// Sole owner of one instrument's [`AggregatedBook`].
///
/// Commands are processed one at a time in arrival order, which is what the
/// book's non-reentrant mutators require. Every delta the book emits is also
/// broadcast to subscribers.
pub struct BookWorker {
    book: AggregatedBook,
    commands: mpsc::Receiver<BookCommand>,
    deltas: broadcast::Sender<QuoteStream>,
}

impl BookWorker {
    /// Move `book` onto its own task. The join handle yields the book back
    /// once the worker shuts down.
    pub fn spawn(
        book: AggregatedBook,
        settings: WorkerSettings,
    ) -> (BookHandle, JoinHandle<AggregatedBook>) {
        let (command_tx, command_rx) = mpsc::channel(settings.command_capacity.max(1));
        let (delta_tx, _) = broadcast::channel(settings.delta_capacity.max(1));

        let handle = BookHandle {
            exchange: book.exchange().to_string(),
            symbol: book.symbol().clone(),
            commands: command_tx,
            deltas: delta_tx.clone(),
        };
        let worker = BookWorker {
            book,
            commands: command_rx,
            deltas: delta_tx,
        };

        (handle, tokio::spawn(worker.run()))
    }

    async fn run(mut self) -> AggregatedBook {
        debug!(
            "Book worker for {} {} started",
            self.book.exchange(),
            self.book.symbol()
        );

        while let Some(command) = self.commands.recv().await {
            match command {
                BookCommand::Snapshot { snapshot, reply } => {
                    self.book.ingest_snapshot(&snapshot);
                    let _ = reply.send(());
                }
                BookCommand::QuoteStream { stream, reply } => {
                    let result = self.book.ingest_quote_stream(&stream);
                    self.publish(&result);
                    let _ = reply.send(result);
                }
                BookCommand::LocalOrders { orders, reply } => {
                    let result = self.book.ingest_local_order_updates(&orders);
                    self.publish(&result);
                    let _ = reply.send(result);
                }
                BookCommand::Read { reply } => {
                    let _ = reply.send(self.book.current_aggregated_snapshot());
                }
                BookCommand::Shutdown => break,
            }
        }

        info!(
            "Book worker for {} {} stopped",
            self.book.exchange(),
            self.book.symbol()
        );
        self.book
    }

    fn publish(&self, result: &Result<Option<QuoteStream>, OrderBookError>) {
        if let Ok(Some(delta)) = result {
            // No subscribers is fine
            let _ = self.deltas.send(delta.clone());
        }
    }
}

/// Cloneable sender side of a [`BookWorker`]
#[derive(Clone)]
pub struct BookHandle {
    exchange: ExchangeId,
    symbol: Symbol,
    commands: mpsc::Sender<BookCommand>,
    deltas: broadcast::Sender<QuoteStream>,
}

impl BookHandle {
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub async fn ingest_snapshot(&self, snapshot: Snapshot) -> Result<(), AggregatorError> {
        self.request(|reply| BookCommand::Snapshot { snapshot, reply })
            .await
    }

    pub async fn ingest_quote_stream(
        &self,
        stream: QuoteStream,
    ) -> Result<Option<QuoteStream>, AggregatorError> {
        Ok(self
            .request(|reply| BookCommand::QuoteStream { stream, reply })
            .await??)
    }

    pub async fn ingest_local_orders(
        &self,
        orders: Vec<LocalOrderUpdate>,
    ) -> Result<Option<QuoteStream>, AggregatorError> {
        Ok(self
            .request(|reply| BookCommand::LocalOrders { orders, reply })
            .await??)
    }

    /// Point-in-time copy of the merged view, ordered after every command
    /// sent before it.
    pub async fn snapshot(&self) -> Result<Snapshot, AggregatorError> {
        self.request(|reply| BookCommand::Read { reply }).await
    }

    /// Receive every delta emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteStream> {
        self.deltas.subscribe()
    }

    /// Ask the worker to stop after the commands already queued
    pub async fn shutdown(&self) -> Result<(), AggregatorError> {
        self.commands
            .send(BookCommand::Shutdown)
            .await
            .map_err(|_| self.closed())
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> BookCommand,
    ) -> Result<T, AggregatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| self.closed())?;
        reply_rx.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> AggregatorError {
        AggregatorError::WorkerClosed {
            exchange: self.exchange.clone(),
            symbol: self.symbol.clone(),
        }
    }
}
