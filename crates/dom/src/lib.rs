//! Live document model: an arena of nodes with parent links, class lists,
//! compound selectors, serialization, and event dispatch on a `Page`.

pub mod class_list;
pub mod document;
pub mod error;
pub mod event;
pub mod page;
pub mod selector;
pub mod serialize;

pub use class_list::ClassList;
pub use document::{Ancestors, Document, NodeId, NodeKind};
pub use error::{DispatchError, DomError, ListenerError, SelectorError};
pub use event::{
    DispatchOutcome, Event, EventType, Listener, ListenerFailure, ListenerId, Phase,
};
pub use page::Page;
pub use selector::{Compound, Selector};
pub use serialize::{node_label, node_to_html, outline, to_html};
