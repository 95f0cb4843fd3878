pub mod error;
pub mod instruction;
pub mod mock;
pub mod rpc;
pub mod variant;

pub use error::SubmitError;
pub use instruction::{
    BatchRecord, BlockRef, ConfirmLevel, Instruction, SignedTransaction, TransactionPayload, TxId,
};
pub use mock::MockLedger;
pub use rpc::HttpLedger;
pub use variant::LedgerVariant;
