//! Structural lookups shared by the rules
//!
//! Given a node, finds the brace tokens, child statements, element lists and
//! documentation headers the layout rules reason about. Every lookup returns
//! `None` (or nothing) when the tree is incomplete, so a rule abstains on
//! code with syntax errors instead of guessing.

use curly_core::trivia::{GapLine, LineKind};
use curly_core::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, TriviaStream};

use CsSyntaxKind::*;

/// Constructs whose body is delimited by a brace pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceConstruct {
    Namespace,
    Type,
    AccessorList,
    Block,
    Switch,
    Initializer,
    AnonymousObject,
}

/// Node kinds that own a brace pair as direct children
pub const BRACE_OWNERS: &[CsSyntaxKind] = &[
    NamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    EnumDecl,
    AccessorList,
    Block,
    SwitchStmt,
    InitializerExpr,
    AnonymousObjectCreationExpr,
];

/// Statements whose single child statement may be written without braces
pub const OMITTABLE_BRACE_CONSTRUCTS: &[CsSyntaxKind] = &[
    IfStmt, WhileStmt, DoStmt, ForStmt, ForEachStmt, LockStmt, FixedStmt, UsingStmt,
];

/// Members whose body is a block
pub const METHOD_LIKE: &[CsSyntaxKind] = &[
    MethodDecl,
    ConstructorDecl,
    DestructorDecl,
    OperatorDecl,
    ConversionOperatorDecl,
    LocalFunctionStmt,
];

/// Elements that carry a body delimited by braces
pub const ELEMENTS_WITH_BODY: &[CsSyntaxKind] = &[
    NamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    EnumDecl,
    MethodDecl,
    ConstructorDecl,
    DestructorDecl,
    OperatorDecl,
    ConversionOperatorDecl,
    LocalFunctionStmt,
    PropertyDecl,
    IndexerDecl,
    EventDecl,
];

/// Nodes whose children are checked for blank-line separation
pub const ELEMENT_CONTAINERS: &[CsSyntaxKind] = &[
    CompilationUnit,
    NamespaceDecl,
    FileScopedNamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    AccessorList,
];

/// Elements that may carry a documentation header
pub const DOCUMENTED_ELEMENTS: &[CsSyntaxKind] = &[
    NamespaceDecl,
    FileScopedNamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    EnumDecl,
    EnumMemberDecl,
    DelegateDecl,
    FieldDecl,
    EventFieldDecl,
    EventDecl,
    PropertyDecl,
    IndexerDecl,
    MethodDecl,
    ConstructorDecl,
    DestructorDecl,
    OperatorDecl,
    ConversionOperatorDecl,
];

fn child_tokens(node: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> {
    node.children_with_tokens().filter_map(|e| e.into_token())
}

pub fn child_token(node: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxToken> {
    child_tokens(node).find(|t| t.kind() == kind)
}

pub fn child_node(node: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxNode> {
    node.children().find(|n| n.kind() == kind)
}

/// First `{` and last `}` directly under `node`
pub fn brace_pair(node: &CsSyntaxNode) -> Option<(CsSyntaxToken, CsSyntaxToken)> {
    let open = child_token(node, LBrace)?;
    let close = child_tokens(node).filter(|t| t.kind() == RBrace).last()?;
    (open.text_range().end() <= close.text_range().start()).then_some((open, close))
}

pub fn brace_construct(node: &CsSyntaxNode) -> Option<BraceConstruct> {
    Some(match node.kind() {
        NamespaceDecl => BraceConstruct::Namespace,
        kind if kind.is_type_declaration() => BraceConstruct::Type,
        AccessorList => BraceConstruct::AccessorList,
        Block => BraceConstruct::Block,
        SwitchStmt => BraceConstruct::Switch,
        InitializerExpr => BraceConstruct::Initializer,
        AnonymousObjectCreationExpr => BraceConstruct::AnonymousObject,
        _ => return None,
    })
}

/// Brace pair of an element's body
///
/// Namespaces and types own their braces; method-like members use their
/// block; properties, indexers and events use their accessor list.
pub fn body_braces(element: &CsSyntaxNode) -> Option<(CsSyntaxToken, CsSyntaxToken)> {
    match element.kind() {
        NamespaceDecl => brace_pair(element),
        kind if kind.is_type_declaration() => brace_pair(element),
        kind if METHOD_LIKE.contains(&kind) => brace_pair(&child_node(element, Block)?),
        PropertyDecl | IndexerDecl | EventDecl => brace_pair(&child_node(element, AccessorList)?),
        _ => None,
    }
}

/// Block that is the body of a lambda or anonymous method
pub fn is_lambda_body(block: &CsSyntaxNode) -> bool {
    block.kind() == Block
        && block
            .parent()
            .is_some_and(|p| matches!(p.kind(), LambdaExpr | AnonymousMethodExpr))
}

/// Block that is the body of a method-like member or local function
pub fn is_member_body(block: &CsSyntaxNode) -> bool {
    block.kind() == Block && block.parent().is_some_and(|p| METHOD_LIKE.contains(&p.kind()))
}

pub fn is_accessor_body(block: &CsSyntaxNode) -> bool {
    block.kind() == Block && block.parent().is_some_and(|p| p.kind() == AccessorDecl)
}

/// Block that is a statement or the body of a statement clause
pub fn is_statement_block(block: &CsSyntaxNode) -> bool {
    block.kind() == Block
        && block.parent().is_some_and(|p| {
            let kind = p.kind();
            (kind.is_statement() && kind != LocalFunctionStmt)
                || matches!(
                    kind,
                    ElseClause | CatchClause | FinallyClause | SwitchSection | GlobalStatement
                )
        })
}

/// Accessor keyword (`get`, `set`, `init`, `add`, `remove`) of an accessor
pub fn accessor_keyword(accessor: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    child_tokens(accessor).find(|t| t.kind().is_accessor_keyword())
}

pub fn accessors(list: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxNode> {
    list.children().filter(|n| n.kind() == AccessorDecl)
}

/// Some accessor of the list has a block body
pub fn has_accessor_bodies(list: &CsSyntaxNode) -> bool {
    accessors(list).any(|a| child_node(&a, Block).is_some())
}

/// The child statement of an omittable-brace construct
pub fn embedded_statement(node: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    if !OMITTABLE_BRACE_CONSTRUCTS.contains(&node.kind()) {
        return None;
    }
    node.children().filter(|c| c.kind().is_statement()).last()
}

pub fn is_braced(statement: &CsSyntaxNode) -> bool {
    statement.kind() == Block
}

/// An `if` that is the `else` branch of an outer `if`
pub fn is_else_if(if_stmt: &CsSyntaxNode) -> bool {
    if_stmt.kind() == IfStmt && if_stmt.parent().is_some_and(|p| p.kind() == ElseClause)
}

/// Clauses of an `if` / `else if` / `else` chain
#[derive(Debug, Clone)]
pub struct IfChain {
    pub clauses: Vec<CsSyntaxNode>,
    pub any_braced: bool,
    pub all_braced: bool,
}

impl IfChain {
    /// Walk the chain starting at an outermost `if`
    ///
    /// Returns `None` for an `if` folded into an outer chain and for chains
    /// with a missing clause.
    pub fn of(if_stmt: &CsSyntaxNode) -> Option<Self> {
        if if_stmt.kind() != IfStmt || is_else_if(if_stmt) {
            return None;
        }
        let mut chain = IfChain {
            clauses: Vec::new(),
            any_braced: false,
            all_braced: true,
        };
        let mut current = if_stmt.clone();
        loop {
            let body = current.children().find(|c| c.kind().is_statement())?;
            chain.push(body);
            let Some(else_clause) = child_node(&current, ElseClause) else {
                break;
            };
            let branch = else_clause.children().find(|c| c.kind().is_statement())?;
            if branch.kind() == IfStmt {
                current = branch;
            } else {
                chain.push(branch);
                break;
            }
        }
        Some(chain)
    }

    fn push(&mut self, clause: CsSyntaxNode) {
        let braced = is_braced(&clause);
        self.any_braced |= braced;
        self.all_braced &= braced;
        self.clauses.push(clause);
    }

    /// Some clauses are braced and others are not
    pub fn is_inconsistent(&self) -> bool {
        self.any_braced && !self.all_braced
    }
}

pub fn ancestor_of_kind(node: &CsSyntaxNode, kinds: &[CsSyntaxKind]) -> Option<CsSyntaxNode> {
    node.ancestors().skip(1).find(|a| kinds.contains(&a.kind()))
}

/// Node that a brace belongs to for indentation purposes
///
/// Blocks and accessor lists hang off the statement or member that owns
/// them; other constructs own their braces directly.
pub fn construct_of(brace: &CsSyntaxToken) -> Option<CsSyntaxNode> {
    let owner = brace.parent()?;
    if matches!(owner.kind(), Block | AccessorList)
        && let Some(parent) = owner.parent()
        && !matches!(
            parent.kind(),
            Block | SwitchSection | GlobalStatement | CompilationUnit
        )
    {
        return Some(parent);
    }
    Some(owner)
}

/// Children that take part in blank-line separation
pub fn is_element(kind: CsSyntaxKind) -> bool {
    matches!(kind, ExternAliasDirective | UsingDirective | AccessorDecl)
        || kind.is_member_declaration()
}

/// Elements of a container, in order
pub fn elements(container: &CsSyntaxNode) -> Vec<CsSyntaxNode> {
    if !ELEMENT_CONTAINERS.contains(&container.kind()) {
        return Vec::new();
    }
    container.children().filter(|c| is_element(c.kind())).collect()
}

/// Outermost node starting at `token` whose kind satisfies `accept`
pub fn node_starting_at(
    token: &CsSyntaxToken,
    accept: impl Fn(CsSyntaxKind) -> bool,
) -> Option<CsSyntaxNode> {
    token
        .parent_ancestors()
        .take_while(|node| node.first_token().as_ref() == Some(token))
        .filter(|node| accept(node.kind()))
        .last()
}

/// Separable element that `token` begins
pub fn element_starting_at(token: &CsSyntaxToken) -> Option<CsSyntaxNode> {
    node_starting_at(token, is_element)
}

/// The documentation comments directly above an element
#[derive(Debug, Clone)]
pub struct DocHeader {
    pub stream: TriviaStream,
    pub lines: Vec<GapLine>,
    /// Index of the first header line
    pub first: usize,
    /// Index of the last header line
    pub last: usize,
}

impl DocHeader {
    pub fn of(element: &CsSyntaxNode) -> Option<Self> {
        if !DOCUMENTED_ELEMENTS.contains(&element.kind()) {
            return None;
        }
        let token = element.first_token()?;
        let stream = TriviaStream::before(&token);
        let lines = stream.lines();
        let is_doc_line = |line: &GapLine| {
            line.kind == LineKind::Comment
                && !line.after_token
                && stream.items()[line.items.clone()]
                    .iter()
                    .any(|item| item.kind.is_doc_comment())
        };
        let last = lines.iter().rposition(is_doc_line)?;
        let first = lines[..last]
            .iter()
            .rposition(|line| !is_doc_line(line))
            .map_or(0, |i| i + 1);
        Some(Self {
            stream,
            lines,
            first,
            last,
        })
    }

    /// Documented element is first in its scope
    pub fn is_first_in_scope(&self) -> bool {
        self.stream
            .prev()
            .is_none_or(|prev| prev.kind() == LBrace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curly_core::SyntaxTree;

    fn first_node(source: &str, kind: CsSyntaxKind) -> CsSyntaxNode {
        let tree = SyntaxTree::parse(source);
        tree.root()
            .descendants()
            .find(|n| n.kind() == kind)
            .expect("node of kind")
    }

    #[test]
    fn test_brace_pair_of_type_and_block() {
        let class = first_node("class A\n{\n    void M() { }\n}\n", ClassDecl);
        let (open, close) = brace_pair(&class).unwrap();
        assert_eq!(u32::from(open.text_range().start()), 8);
        assert_eq!(u32::from(close.text_range().start()), 27);

        let method = first_node("class A\n{\n    void M() { }\n}\n", MethodDecl);
        let (open, close) = body_braces(&method).unwrap();
        assert_eq!(open.parent().unwrap().kind(), Block);
        assert_eq!(close.kind(), RBrace);
    }

    #[test]
    fn test_missing_brace_abstains() {
        let class = first_node("class A\n{\n    int x;\n", ClassDecl);
        assert!(brace_pair(&class).is_none());
    }

    #[test]
    fn test_if_chain_folds_else_if() {
        let source = "class A\n{\n    void M()\n    {\n        if (a) b(); else if (c) { d(); } else e();\n    }\n}\n";
        let tree = SyntaxTree::parse(source);
        let ifs: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == IfStmt)
            .collect();
        assert_eq!(ifs.len(), 2);
        assert!(IfChain::of(&ifs[1]).is_none());

        let chain = IfChain::of(&ifs[0]).unwrap();
        assert_eq!(chain.clauses.len(), 3);
        assert!(chain.any_braced);
        assert!(!chain.all_braced);
        assert!(chain.is_inconsistent());
        assert_eq!(chain.clauses[1].kind(), Block);
    }

    #[test]
    fn test_embedded_statement_of_loops() {
        let source = "class A\n{\n    void M()\n    {\n        for (int i = 0; i < n; i++) Step(i);\n        using (var s = Open()) { }\n    }\n}\n";
        let for_stmt = first_node(source, ForStmt);
        assert_eq!(embedded_statement(&for_stmt).unwrap().kind(), ExprStmt);
        let using = first_node(source, UsingStmt);
        assert_eq!(embedded_statement(&using).unwrap().kind(), Block);
    }

    #[test]
    fn test_block_classification() {
        let source = "class A\n{\n    void M()\n    {\n        Run(() => { });\n        if (x) { }\n    }\n}\n";
        let tree = SyntaxTree::parse(source);
        let blocks: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == Block)
            .collect();
        assert_eq!(blocks.len(), 3);
        assert!(is_member_body(&blocks[0]));
        assert!(is_lambda_body(&blocks[1]));
        assert!(is_statement_block(&blocks[2]));
        assert!(!is_statement_block(&blocks[0]));
    }

    #[test]
    fn test_doc_header_lines() {
        let source = "class A\n{\n    int x;\n    /// <summary>\n    /// Doc.\n    /// </summary>\n\n    int y;\n}\n";
        let field = first_node(source, FieldDecl);
        assert!(DocHeader::of(&field).is_none());

        let tree = SyntaxTree::parse(source);
        let second = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == FieldDecl)
            .nth(1)
            .unwrap();
        let header = DocHeader::of(&second).unwrap();
        assert_eq!((header.first, header.last), (1, 3));
        assert!(header.lines[4].is_blank());
        assert!(!header.is_first_in_scope());
    }

    #[test]
    fn test_elements_of_container() {
        let source = "using A;\nusing B;\nnamespace N\n{\n    class C { }\n}\n";
        let tree = SyntaxTree::parse(source);
        let kinds: Vec<_> = elements(&tree.root()).iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![UsingDirective, UsingDirective, NamespaceDecl]);
    }

    #[test]
    fn test_element_starting_at_attribute() {
        let source = "class C\n{\n    [Obsolete]\n    void M() { }\n}\n";
        let tree = SyntaxTree::parse(source);
        let bracket = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == LBracket)
            .unwrap();
        let element = element_starting_at(&bracket).unwrap();
        assert_eq!(element.kind(), MethodDecl);
    }
}
