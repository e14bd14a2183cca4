//! jsnorm_compiler: pipeline orchestration.
//!
//! A [`Program`] owns the interner, the unique-id supplier, and the source
//! files; `compile` parses every file into one `Root`, runs the configured
//! pass, and prints each script back to text.

use jsnorm_ast::{Ast, InputId, NodeId, Token};
use jsnorm_core::intern::StringInterner;
use jsnorm_core::text::TextSpan;
use jsnorm_core::unique::UniqueIdSupplier;
use jsnorm_diagnostics::DiagnosticCollection;
use jsnorm_options::CompilerOptions;
use jsnorm_parser::Parser;
use jsnorm_printer::{Printer, PrinterOptions};
use jsnorm_rename::{
    annotate_constant_names, DefaultCodingConvention, NameUniquifier, RenameInverter,
};
use jsnorm_scopes::ScopeError;
use thiserror::Error;
use tracing::debug;

/// Errors that abort a compilation. Syntax problems do not abort; they are
/// reported through the diagnostics in [`CompileResult`].
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// One emitted output file.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub text: String,
}

/// The result of a compilation.
#[derive(Debug)]
pub struct CompileResult {
    pub outputs: Vec<OutputFile>,
    pub diagnostics: DiagnosticCollection,
}

/// One compiler invocation over a set of source files.
pub struct Program {
    options: CompilerOptions,
    interner: StringInterner,
    supplier: UniqueIdSupplier,
    source_files: Vec<(String, String)>,
}

impl Program {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            interner: StringInterner::new(),
            supplier: UniqueIdSupplier::new(),
            source_files: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn add_source(&mut self, file_name: impl Into<String>, source_text: impl Into<String>) {
        self.source_files.push((file_name.into(), source_text.into()));
    }

    /// Load the given files from disk into the program.
    pub fn load_root_files(&mut self, files: &[String]) -> Result<(), CompileError> {
        for file in files {
            let content = std::fs::read_to_string(file).map_err(|source| CompileError::Io {
                path: file.clone(),
                source,
            })?;
            self.source_files.push((file.clone(), content));
        }
        Ok(())
    }

    /// The process-wide id source for rename suffixes.
    pub fn unique_name_id_supplier(&self) -> UniqueIdSupplier {
        self.supplier.clone()
    }

    /// Reset the id source so equivalent inputs produce identical output.
    pub fn reset_unique_name_id(&self) {
        self.supplier.reset();
    }

    /// Parse, rename (or invert), and print every source file.
    pub fn compile(&self) -> Result<CompileResult, CompileError> {
        let mut diagnostics = DiagnosticCollection::new();
        let mut ast = Ast::new(self.interner.clone());
        let root = ast.new_node(Token::Root, TextSpan::empty(0));

        let mut scripts: Vec<(String, NodeId)> = Vec::new();
        for (index, (file_name, source_text)) in self.source_files.iter().enumerate() {
            debug!(file = file_name.as_str(), "parsing");
            let parser = Parser::new(&mut ast, file_name, source_text, self.options.language());
            let (script, file_diagnostics) = parser.parse_script(InputId(index as u32));
            diagnostics.extend(file_diagnostics);
            ast.append_child(root, script);
            scripts.push((file_name.clone(), script));
        }
        diagnostics.sort();

        self.reset_unique_name_id();
        self.run_pass(&mut ast, root)?;

        let mut outputs = Vec::new();
        for (file_name, script) in scripts {
            let printer = Printer::with_options(
                &ast,
                PrinterOptions {
                    pretty: self.options.pretty,
                    ..PrinterOptions::default()
                },
            );
            outputs.push(OutputFile {
                name: file_name,
                text: printer.print(script),
            });
        }

        Ok(CompileResult {
            outputs,
            diagnostics,
        })
    }

    fn run_pass(&self, ast: &mut Ast, root: NodeId) -> Result<(), CompileError> {
        if self.options.invert {
            RenameInverter::new().process(ast, root)?;
        } else if self.options.use_default_renamer {
            NameUniquifier::contextual().process(ast, root)?;
        } else {
            let convention = DefaultCodingConvention;
            if self.options.remove_const {
                annotate_constant_names(ast, root, &convention);
            }
            NameUniquifier::inline(
                Box::new(convention),
                self.supplier.clone(),
                self.options.local_name_prefix.clone(),
                self.options.remove_const,
            )
            .process(ast, root)?;
        }
        Ok(())
    }
}
