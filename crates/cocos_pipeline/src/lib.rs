//! # Cocos Pipeline
//!
//! Request/response mediation for the Cocos Creator editor's HTTP API.
//!
//! Every action is addressed by a `(module, action)` pair and passes through
//! four stages:
//!
//! 1. **Validate**: synchronous shape checks, failing fast with a
//!    [`ValidationError`] before any network traffic
//! 2. **Preprocess**: rewrites params, or answers the request itself
//!    (`skip_api_call`) after auxiliary lookups
//! 3. **Transport**: one HTTP call, performed by the client that drives the
//!    pipeline
//! 4. **Postprocess**: reshapes the response, possibly issuing follow-up calls
//!
//! Stages are looked up in a [`ProcessorRegistry`]; an action with nothing
//! registered passes through untouched.
//!
//! ## Built-in behaviour
//!
//! - **Cycle-safe reparent**: `scene:set-parent` refuses to move a node under
//!   itself or one of its descendants
//! - **Type expansion**: `scene:create-node` with a semantic `type` attaches the
//!   type's components and creates its children
//! - **Batch property set**: `scene:set-property` with a property list becomes
//!   one primitive write per property
//! - **Response flattening**: node and component queries lose their
//!   `{ "value": ... }` wrappers
//! - **Identifier codec**: see [`identifier`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use cocos_pipeline::{EditorHandle, Pipeline};
//! use serde_json::json;
//!
//! async fn move_node(editor: &dyn EditorHandle) -> Result<(), cocos_pipeline::PipelineError> {
//!     let pipeline = Pipeline::with_builtins();
//!     let result = pipeline
//!         .process_request("scene", "set-parent", vec![json!({"uuids": ["a"], "parent": "b"})], editor)
//!         .await?;
//!     assert!(!result.skip_api_call);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod identifier;
pub mod pipeline;
pub mod processors;
pub mod registry;
pub mod scene;
pub mod tables;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{IdentifierError, NodeTypeTableError, PipelineError, ValidationError};
pub use pipeline::Pipeline;
pub use registry::{ProcessorRegistry, ProcessorRegistryBuilder, Registry};
pub use tables::{NodeTypeSpec, NodeTypeTable};
pub use traits::{EditorHandle, Postprocessor, Preprocessor, Validator};
pub use types::{ActionKey, ApiResponse, Params, PipelineResult, PreparedParams, Preprocessed};
