//! Thin wrapper over rowan's green node builder

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::{CsSyntaxKind, CsSyntaxNode};

/// Builds a green tree node by node, token by token
#[derive(Default)]
pub struct CstBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    /// Start a node that wraps everything added since `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    pub fn token(&mut self, kind: CsSyntaxKind, text: &str) {
        self.builder.token(kind.into(), text);
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub fn finish_green(self) -> GreenNode {
        self.builder.finish()
    }

    pub fn finish(self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.finish_green())
    }
}
