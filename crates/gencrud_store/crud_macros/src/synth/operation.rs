//! The closed set of generated operations.

use proc_macro2::TokenStream;

use super::{Context, member, peer};

/// One generated CRUD operation.
///
/// Every operation is rendered twice: as a forwarder on the model and as
/// the real implementation on the model's actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Operation {
    Create,
    Update,
    Delete,
    List,
    Observe,
}

/// Renders one operation's two halves.
#[derive(Clone, Copy)]
pub(crate) struct Renderer {
    /// Forwarder emitted on the model.
    pub member: fn(&Context<'_>) -> TokenStream,
    /// Implementation emitted on the actor.
    pub peer: fn(&Context<'_>) -> TokenStream,
}

impl Operation {
    /// Every operation, in emission order.
    pub(crate) const ALL: [Self; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::List,
        Self::Observe,
    ];

    /// Method name used on both the model and the actor.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Observe => "observe",
        }
    }

    pub(crate) fn renderer(self) -> Renderer {
        match self {
            Self::Create => Renderer {
                member: member::create,
                peer: peer::create,
            },
            Self::Update => Renderer {
                member: member::update,
                peer: peer::update,
            },
            Self::Delete => Renderer {
                member: member::delete,
                peer: peer::delete,
            },
            Self::List => Renderer {
                member: member::list,
                peer: peer::list,
            },
            Self::Observe => Renderer {
                member: member::observe,
                peer: peer::observe,
            },
        }
    }
}
