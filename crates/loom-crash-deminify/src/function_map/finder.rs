// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Syntax tree walk that collects every function with its name bindings.
//!
//! The walk keeps its own ancestor stack so that, once a function body has
//! been visited, the bindings naming the function can be found by climbing
//! towards the enclosing statement.

use loom_sourcemap::{SourceMap, SourcePosition};
use swc_common::{BytePos, SourceMap as CodeMap, Span, Spanned};
use swc_ecma_ast::{
	AssignTarget, AssignTargetPat, BlockStmt, BlockStmtOrExpr, Callee, Class, ClassMember, Decl, DefaultDecl, Expr,
	ExprOrSpread, ForHead, Function, Ident, Lit, MemberExpr, MemberProp, ModuleDecl, ModuleItem, ObjectPat,
	ObjectPatProp, OptChainBase, ParamOrTsParamProp, Pat, Program, Prop, PropName, PropOrSpread, SimpleAssignTarget,
	Stmt, SuperProp, VarDecl, VarDeclOrExpr, VarDeclarator,
};

use super::generator::deminified_method_name;
use super::{BindingInformation, FunctionMapEntry};

/// An ancestor of the node being visited, as far as binding resolution cares.
#[derive(Clone, Copy)]
enum Node<'a> {
	Statement,
	Expr(&'a Expr),
	Pat(&'a Pat),
	AssignTarget(&'a AssignTarget),
	VarDeclarator(&'a VarDeclarator),
	Prop(&'a Prop),
	ClassMember(&'a ClassMember),
	Function { ident: Option<&'a Ident>, declaration: bool },
}

const METHOD_FUNCTION: Node<'static> = Node::Function {
	ident: None,
	declaration: false,
};

impl Node<'_> {
	fn is_statement(self) -> bool {
		matches!(self, Node::Statement | Node::Function { declaration: true, .. })
	}

	fn is_expr(self, expr: &Expr) -> bool {
		matches!(self, Node::Expr(node) if std::ptr::eq(node, expr))
	}
}

pub(super) struct FunctionFinder<'a> {
	code_map: &'a CodeMap,
	source_map: &'a SourceMap,
	stack: Vec<Node<'a>>,
	entries: Vec<FunctionMapEntry>,
}

impl<'a> FunctionFinder<'a> {
	pub(super) fn new(code_map: &'a CodeMap, source_map: &'a SourceMap) -> Self {
		Self {
			code_map,
			source_map,
			stack: Vec::new(),
			entries: Vec::new(),
		}
	}

	/// Collect all named functions, sorted by descending body start.
	pub(super) fn find(mut self, program: &'a Program) -> Vec<FunctionMapEntry> {
		match program {
			Program::Module(module) => {
				for item in &module.body {
					match item {
						ModuleItem::Stmt(stmt) => self.walk_stmt(stmt),
						ModuleItem::ModuleDecl(decl) => self.walk_module_decl(decl),
					}
				}
			}
			Program::Script(script) => self.walk_stmts(&script.body),
		}

		let mut entries = self.entries;
		entries.sort_by(|a, b| b.start.cmp(&a.start));
		entries
	}

	fn enter(&mut self, node: Node<'a>, walk: impl FnOnce(&mut Self)) {
		self.stack.push(node);
		walk(self);
		self.stack.pop();
	}

	fn parent_at(&self, offset: usize) -> Option<Node<'a>> {
		let idx = self.stack.len().checked_sub(offset + 1)?;
		self.stack.get(idx).copied()
	}

	fn position(&self, pos: BytePos) -> SourcePosition {
		let loc = self.code_map.lookup_char_pos(pos);
		let line = u32::try_from(loc.line.saturating_sub(1)).unwrap_or(u32::MAX);
		let column = u32::try_from(loc.col.0).unwrap_or(u32::MAX);
		SourcePosition::new(line, column)
	}

	/// Register the function on top of the stack, whose body spans `body`.
	fn record(&mut self, body: Span) {
		let Some(function) = self.stack.last().copied() else {
			return;
		};

		let mut bindings = Vec::new();
		self.collect_bindings(function, 1, &mut bindings);

		// no bindings: an anonymous local function nobody can name
		if bindings.is_empty() {
			return;
		}

		let entry = FunctionMapEntry {
			deminified_method_name: deminified_method_name(self.source_map, &bindings),
			bindings,
			start: self.position(body.lo),
			end: self.position(body.hi),
		};
		self.entries.push(entry);
	}

	fn collect_bindings(&self, node: Node<'a>, parent_index: usize, out: &mut Vec<BindingInformation>) {
		if let Some(parent) = self.parent_at(parent_index) {
			match parent {
				Node::Expr(Expr::Member(member)) => {
					if node.is_expr(&member.obj) {
						self.collect_bindings(parent, parent_index + 1, out);
					}
				}
				Node::Pat(Pat::Assign(pattern)) => {
					if node.is_expr(&pattern.right) {
						self.collect_bindings(Node::Pat(&pattern.left), parent_index + 1, out);
					}
				}
				Node::Expr(Expr::Assign(assign)) => {
					if node.is_expr(&assign.right) {
						self.collect_bindings(Node::AssignTarget(&assign.left), parent_index + 1, out);
					}
				}
				Node::Expr(Expr::Bin(binary)) => {
					if node.is_expr(&binary.right) {
						self.collect_bindings(Node::Expr(&binary.left), parent_index + 1, out);
					}
				}
				parent if parent.is_statement() => {}
				_ => self.collect_bindings(parent, parent_index + 1, out),
			}
		}

		self.collect_node_bindings(node, out);
	}

	fn collect_node_bindings(&self, node: Node<'a>, out: &mut Vec<BindingInformation>) {
		match node {
			Node::Expr(expr) => self.collect_expr_bindings(expr, out),
			Node::Pat(pat) => self.collect_pat_bindings(pat, out),
			Node::AssignTarget(target) => match target {
				AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
					self.push_binding(&binding.id.sym, binding.id.span, out)
				}
				AssignTarget::Simple(SimpleAssignTarget::Member(member)) => self.collect_member_bindings(member, out),
				_ => {}
			},
			Node::VarDeclarator(declarator) => self.collect_pat_bindings(&declarator.name, out),
			Node::Prop(prop) => match prop {
				Prop::KeyValue(prop) => self.collect_prop_name_bindings(&prop.key, out),
				Prop::Method(prop) => self.collect_prop_name_bindings(&prop.key, out),
				Prop::Getter(prop) => self.collect_prop_name_bindings(&prop.key, out),
				Prop::Setter(prop) => self.collect_prop_name_bindings(&prop.key, out),
				Prop::Assign(prop) => self.push_binding(&prop.key.sym, prop.key.span, out),
				Prop::Shorthand(ident) => self.push_binding(&ident.sym, ident.span, out),
			},
			Node::ClassMember(member) => match member {
				ClassMember::Constructor(constructor) => self.collect_prop_name_bindings(&constructor.key, out),
				ClassMember::Method(method) => self.collect_prop_name_bindings(&method.key, out),
				ClassMember::ClassProp(prop) => self.collect_prop_name_bindings(&prop.key, out),
				_ => {}
			},
			Node::Function {
				ident: Some(ident), ..
			} => self.push_binding(&ident.sym, ident.span, out),
			Node::Function { ident: None, .. } | Node::Statement => {}
		}
	}

	fn collect_expr_bindings(&self, expr: &Expr, out: &mut Vec<BindingInformation>) {
		match expr {
			Expr::Fn(function) => {
				if let Some(ident) = &function.ident {
					self.push_binding(&ident.sym, ident.span, out);
				}
			}
			Expr::Class(class) => {
				if let Some(ident) = &class.ident {
					self.push_binding(&ident.sym, ident.span, out);
				}
			}
			Expr::Member(member) => self.collect_member_bindings(member, out),
			Expr::Ident(ident) => self.push_binding(&ident.sym, ident.span, out),
			Expr::Lit(lit) => self.collect_lit_bindings(lit, out),
			Expr::Paren(paren) => self.collect_expr_bindings(&paren.expr, out),
			_ => {}
		}
	}

	fn collect_member_bindings(&self, member: &MemberExpr, out: &mut Vec<BindingInformation>) {
		self.collect_expr_bindings(&member.obj, out);
		match &member.prop {
			MemberProp::Ident(ident) => self.push_binding(&ident.sym, ident.span, out),
			MemberProp::Computed(computed) => self.collect_expr_bindings(&computed.expr, out),
			_ => {}
		}
	}

	fn collect_pat_bindings(&self, pat: &Pat, out: &mut Vec<BindingInformation>) {
		match pat {
			Pat::Ident(binding) => self.push_binding(&binding.id.sym, binding.id.span, out),
			Pat::Expr(expr) => self.collect_expr_bindings(expr, out),
			_ => {}
		}
	}

	fn collect_prop_name_bindings(&self, key: &PropName, out: &mut Vec<BindingInformation>) {
		match key {
			PropName::Ident(ident) => self.push_binding(&ident.sym, ident.span, out),
			PropName::Str(s) => {
				let raw = s.raw.as_ref().map(|raw| raw.to_string());
				self.push_binding(&raw.unwrap_or_else(|| format!("\"{}\"", s.value)), s.span, out);
			}
			PropName::Num(n) => {
				let raw = n.raw.as_ref().map(|raw| raw.to_string());
				self.push_binding(&raw.unwrap_or_else(|| n.value.to_string()), n.span, out);
			}
			PropName::Computed(computed) => self.collect_expr_bindings(&computed.expr, out),
			_ => {}
		}
	}

	fn collect_lit_bindings(&self, lit: &Lit, out: &mut Vec<BindingInformation>) {
		match lit {
			Lit::Str(s) => {
				let raw = s.raw.as_ref().map(|raw| raw.to_string());
				self.push_binding(&raw.unwrap_or_else(|| format!("\"{}\"", s.value)), s.span, out);
			}
			Lit::Num(n) => {
				let raw = n.raw.as_ref().map(|raw| raw.to_string());
				self.push_binding(&raw.unwrap_or_else(|| n.value.to_string()), n.span, out);
			}
			_ => {}
		}
	}

	fn push_binding(&self, name: &str, span: Span, out: &mut Vec<BindingInformation>) {
		out.push(BindingInformation {
			name: name.to_string(),
			source_position: self.position(span.lo),
		});
	}

	fn walk_module_decl(&mut self, decl: &'a ModuleDecl) {
		self.enter(Node::Statement, move |this| match decl {
			ModuleDecl::ExportDecl(export) => this.walk_decl(&export.decl),
			ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
				DefaultDecl::Fn(function) => this.walk_function(
					Node::Function {
						ident: function.ident.as_ref(),
						declaration: true,
					},
					&function.function,
				),
				DefaultDecl::Class(class) => this.walk_class(&class.class),
				_ => {}
			},
			ModuleDecl::ExportDefaultExpr(export) => this.walk_expr(&export.expr),
			_ => {}
		});
	}

	fn walk_stmts(&mut self, stmts: &'a [Stmt]) {
		for stmt in stmts {
			self.walk_stmt(stmt);
		}
	}

	fn walk_block(&mut self, block: &'a BlockStmt) {
		self.enter(Node::Statement, move |this| this.walk_stmts(&block.stmts));
	}

	fn walk_stmt(&mut self, stmt: &'a Stmt) {
		self.enter(Node::Statement, move |this| match stmt {
			Stmt::Block(block) => this.walk_stmts(&block.stmts),
			Stmt::With(with) => {
				this.walk_expr(&with.obj);
				this.walk_stmt(&with.body);
			}
			Stmt::Return(ret) => {
				if let Some(arg) = &ret.arg {
					this.walk_expr(arg);
				}
			}
			Stmt::Labeled(labeled) => this.walk_stmt(&labeled.body),
			Stmt::If(if_stmt) => {
				this.walk_expr(&if_stmt.test);
				this.walk_stmt(&if_stmt.cons);
				if let Some(alt) = &if_stmt.alt {
					this.walk_stmt(alt);
				}
			}
			Stmt::Switch(switch) => {
				this.walk_expr(&switch.discriminant);
				for case in &switch.cases {
					if let Some(test) = &case.test {
						this.walk_expr(test);
					}
					this.walk_stmts(&case.cons);
				}
			}
			Stmt::Throw(throw) => this.walk_expr(&throw.arg),
			Stmt::Try(try_stmt) => {
				this.walk_block(&try_stmt.block);
				if let Some(handler) = &try_stmt.handler {
					if let Some(param) = &handler.param {
						this.walk_pat(param);
					}
					this.walk_block(&handler.body);
				}
				if let Some(finalizer) = &try_stmt.finalizer {
					this.walk_block(finalizer);
				}
			}
			Stmt::While(while_stmt) => {
				this.walk_expr(&while_stmt.test);
				this.walk_stmt(&while_stmt.body);
			}
			Stmt::DoWhile(do_while) => {
				this.walk_stmt(&do_while.body);
				this.walk_expr(&do_while.test);
			}
			Stmt::For(for_stmt) => {
				match &for_stmt.init {
					Some(VarDeclOrExpr::VarDecl(decl)) => this.walk_var_decl(decl),
					Some(VarDeclOrExpr::Expr(expr)) => this.walk_expr(expr),
					None => {}
				}
				if let Some(test) = &for_stmt.test {
					this.walk_expr(test);
				}
				if let Some(update) = &for_stmt.update {
					this.walk_expr(update);
				}
				this.walk_stmt(&for_stmt.body);
			}
			Stmt::ForIn(for_in) => {
				this.walk_for_head(&for_in.left);
				this.walk_expr(&for_in.right);
				this.walk_stmt(&for_in.body);
			}
			Stmt::ForOf(for_of) => {
				this.walk_for_head(&for_of.left);
				this.walk_expr(&for_of.right);
				this.walk_stmt(&for_of.body);
			}
			Stmt::Decl(decl) => this.walk_decl(decl),
			Stmt::Expr(expr) => this.walk_expr(&expr.expr),
			_ => {}
		});
	}

	fn walk_for_head(&mut self, head: &'a ForHead) {
		match head {
			ForHead::VarDecl(decl) => self.walk_var_decl(decl),
			ForHead::Pat(pat) => self.walk_pat(pat),
			_ => {}
		}
	}

	fn walk_decl(&mut self, decl: &'a Decl) {
		match decl {
			Decl::Fn(function) => self.walk_function(
				Node::Function {
					ident: Some(&function.ident),
					declaration: true,
				},
				&function.function,
			),
			Decl::Class(class) => self.enter(Node::Statement, move |this| this.walk_class(&class.class)),
			Decl::Var(var) => self.walk_var_decl(var),
			Decl::Using(using) => self.enter(Node::Statement, move |this| {
				for declarator in &using.decls {
					this.walk_var_declarator(declarator);
				}
			}),
			_ => {}
		}
	}

	fn walk_var_decl(&mut self, decl: &'a VarDecl) {
		self.enter(Node::Statement, move |this| {
			for declarator in &decl.decls {
				this.walk_var_declarator(declarator);
			}
		});
	}

	fn walk_var_declarator(&mut self, declarator: &'a VarDeclarator) {
		self.enter(Node::VarDeclarator(declarator), move |this| {
			this.walk_pat(&declarator.name);
			if let Some(init) = &declarator.init {
				this.walk_expr(init);
			}
		});
	}

	fn walk_function(&mut self, node: Node<'a>, function: &'a Function) {
		self.enter(node, move |this| this.walk_function_contents(function));
	}

	/// Walk parameters and body of the function currently on top of the stack.
	fn walk_function_contents(&mut self, function: &'a Function) {
		for param in &function.params {
			self.walk_pat(&param.pat);
		}
		if let Some(body) = &function.body {
			self.walk_block(body);
			self.record(body.span);
		}
	}

	fn walk_class(&mut self, class: &'a Class) {
		if let Some(super_class) = &class.super_class {
			self.walk_expr(super_class);
		}
		for member in &class.body {
			self.walk_class_member(member);
		}
	}

	fn walk_class_member(&mut self, member: &'a ClassMember) {
		self.enter(Node::ClassMember(member), move |this| match member {
			ClassMember::Constructor(constructor) => {
				this.walk_prop_name(&constructor.key);
				this.enter(METHOD_FUNCTION, move |this| {
					for param in &constructor.params {
						if let ParamOrTsParamProp::Param(param) = param {
							this.walk_pat(&param.pat);
						}
					}
					if let Some(body) = &constructor.body {
						this.walk_block(body);
						this.record(body.span);
					}
				});
			}
			ClassMember::Method(method) => {
				this.walk_prop_name(&method.key);
				this.walk_function(METHOD_FUNCTION, &method.function);
			}
			ClassMember::PrivateMethod(method) => this.walk_function(METHOD_FUNCTION, &method.function),
			ClassMember::ClassProp(prop) => {
				this.walk_prop_name(&prop.key);
				if let Some(value) = &prop.value {
					this.walk_expr(value);
				}
			}
			ClassMember::PrivateProp(prop) => {
				if let Some(value) = &prop.value {
					this.walk_expr(value);
				}
			}
			ClassMember::StaticBlock(block) => this.walk_block(&block.body),
			_ => {}
		});
	}

	fn walk_prop_name(&mut self, key: &'a PropName) {
		if let PropName::Computed(computed) = key {
			self.walk_expr(&computed.expr);
		}
	}

	fn walk_prop(&mut self, prop: &'a Prop) {
		self.enter(Node::Prop(prop), move |this| match prop {
			Prop::KeyValue(prop) => {
				this.walk_prop_name(&prop.key);
				this.walk_expr(&prop.value);
			}
			Prop::Assign(prop) => this.walk_expr(&prop.value),
			Prop::Getter(getter) => {
				this.walk_prop_name(&getter.key);
				if let Some(body) = &getter.body {
					this.enter(METHOD_FUNCTION, move |this| {
						this.walk_block(body);
						this.record(body.span);
					});
				}
			}
			Prop::Setter(setter) => {
				this.walk_prop_name(&setter.key);
				this.enter(METHOD_FUNCTION, move |this| {
					this.walk_pat(&setter.param);
					if let Some(body) = &setter.body {
						this.walk_block(body);
						this.record(body.span);
					}
				});
			}
			Prop::Method(method) => {
				this.walk_prop_name(&method.key);
				this.walk_function(METHOD_FUNCTION, &method.function);
			}
			_ => {}
		});
	}

	fn walk_pat(&mut self, pat: &'a Pat) {
		self.enter(Node::Pat(pat), move |this| match pat {
			Pat::Array(array) => {
				for elem in array.elems.iter().flatten() {
					this.walk_pat(elem);
				}
			}
			Pat::Rest(rest) => this.walk_pat(&rest.arg),
			Pat::Object(object) => this.walk_object_pat(object),
			Pat::Assign(assign) => {
				this.walk_pat(&assign.left);
				this.walk_expr(&assign.right);
			}
			Pat::Expr(expr) => this.walk_expr(expr),
			_ => {}
		});
	}

	fn walk_object_pat(&mut self, object: &'a ObjectPat) {
		for prop in &object.props {
			match prop {
				ObjectPatProp::KeyValue(prop) => {
					self.walk_prop_name(&prop.key);
					self.walk_pat(&prop.value);
				}
				ObjectPatProp::Assign(prop) => {
					if let Some(value) = &prop.value {
						self.walk_expr(value);
					}
				}
				ObjectPatProp::Rest(rest) => self.walk_pat(&rest.arg),
			}
		}
	}

	fn walk_assign_target(&mut self, target: &'a AssignTarget) {
		self.enter(Node::AssignTarget(target), move |this| match target {
			AssignTarget::Simple(SimpleAssignTarget::Member(member)) => this.walk_member(member),
			AssignTarget::Simple(SimpleAssignTarget::Paren(paren)) => this.walk_expr(&paren.expr),
			AssignTarget::Simple(SimpleAssignTarget::SuperProp(super_prop)) => {
				if let SuperProp::Computed(computed) = &super_prop.prop {
					this.walk_expr(&computed.expr);
				}
			}
			AssignTarget::Pat(AssignTargetPat::Array(array)) => {
				for elem in array.elems.iter().flatten() {
					this.walk_pat(elem);
				}
			}
			AssignTarget::Pat(AssignTargetPat::Object(object)) => this.walk_object_pat(object),
			_ => {}
		});
	}

	fn walk_member(&mut self, member: &'a MemberExpr) {
		self.walk_expr(&member.obj);
		if let MemberProp::Computed(computed) = &member.prop {
			self.walk_expr(&computed.expr);
		}
	}

	fn walk_args(&mut self, args: &'a [ExprOrSpread]) {
		for arg in args {
			self.walk_expr(&arg.expr);
		}
	}

	fn walk_expr(&mut self, expr: &'a Expr) {
		self.enter(Node::Expr(expr), move |this| match expr {
			Expr::Fn(function) => this.walk_function_contents(&function.function),
			Expr::Arrow(arrow) => {
				for param in &arrow.params {
					this.walk_pat(param);
				}
				match &*arrow.body {
					BlockStmtOrExpr::BlockStmt(block) => {
						this.walk_block(block);
						this.record(block.span);
					}
					BlockStmtOrExpr::Expr(body) => {
						this.walk_expr(body);
						this.record(body.span());
					}
				}
			}
			Expr::Class(class) => this.walk_class(&class.class),
			Expr::Member(member) => this.walk_member(member),
			Expr::SuperProp(super_prop) => {
				if let SuperProp::Computed(computed) = &super_prop.prop {
					this.walk_expr(&computed.expr);
				}
			}
			Expr::Assign(assign) => {
				this.walk_assign_target(&assign.left);
				this.walk_expr(&assign.right);
			}
			Expr::Bin(binary) => {
				this.walk_expr(&binary.left);
				this.walk_expr(&binary.right);
			}
			Expr::Unary(unary) => this.walk_expr(&unary.arg),
			Expr::Update(update) => this.walk_expr(&update.arg),
			Expr::Await(await_expr) => this.walk_expr(&await_expr.arg),
			Expr::Yield(yield_expr) => {
				if let Some(arg) = &yield_expr.arg {
					this.walk_expr(arg);
				}
			}
			Expr::Paren(paren) => this.walk_expr(&paren.expr),
			Expr::Cond(cond) => {
				this.walk_expr(&cond.test);
				this.walk_expr(&cond.cons);
				this.walk_expr(&cond.alt);
			}
			Expr::Seq(seq) => {
				for expr in &seq.exprs {
					this.walk_expr(expr);
				}
			}
			Expr::Call(call) => {
				if let Callee::Expr(callee) = &call.callee {
					this.walk_expr(callee);
				}
				this.walk_args(&call.args);
			}
			Expr::New(new) => {
				this.walk_expr(&new.callee);
				if let Some(args) = &new.args {
					this.walk_args(args);
				}
			}
			Expr::Array(array) => {
				for elem in array.elems.iter().flatten() {
					this.walk_expr(&elem.expr);
				}
			}
			Expr::Object(object) => {
				for prop in &object.props {
					match prop {
						PropOrSpread::Prop(prop) => this.walk_prop(prop),
						PropOrSpread::Spread(spread) => this.walk_expr(&spread.expr),
					}
				}
			}
			Expr::Tpl(tpl) => {
				for expr in &tpl.exprs {
					this.walk_expr(expr);
				}
			}
			Expr::TaggedTpl(tagged) => {
				this.walk_expr(&tagged.tag);
				for expr in &tagged.tpl.exprs {
					this.walk_expr(expr);
				}
			}
			Expr::OptChain(chain) => match &*chain.base {
				OptChainBase::Member(member) => this.walk_member(member),
				OptChainBase::Call(call) => {
					this.walk_expr(&call.callee);
					this.walk_args(&call.args);
				}
			},
			_ => {}
		});
	}
}
