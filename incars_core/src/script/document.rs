//! The script document: a fixed, ordered set of text blocks
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::configuration;
use crate::script::ScriptError;

/// Blocks of a script, in the order they are rendered
///
/// The engine executes the script top to bottom, so objects defined in an earlier block
/// (reactions, tracers, measurements) can be referenced by later ones (experiments, model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Reactions,
    Tracers,
    Fluxes,
    MsFragments,
    PoolSizes,
    Experiments,
    Model,
    ModelModifications,
    Options,
    /// Check that the fluxes of the model are feasible, only holds a fixed directive
    VerifyModel,
    Runner,
}

impl Block {
    /// All blocks in render order
    pub const ALL: [Block; 11] = [
        Block::Reactions,
        Block::Tracers,
        Block::Fluxes,
        Block::MsFragments,
        Block::PoolSizes,
        Block::Experiments,
        Block::Model,
        Block::ModelModifications,
        Block::Options,
        Block::VerifyModel,
        Block::Runner,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Block::Reactions => "reactions",
            Block::Tracers => "tracers",
            Block::Fluxes => "fluxes",
            Block::MsFragments => "ms_fragments",
            Block::PoolSizes => "pool_sizes",
            Block::Experiments => "experiments",
            Block::Model => "model",
            Block::ModelModifications => "model_modifications",
            Block::Options => "options",
            Block::VerifyModel => "_verify_model",
            Block::Runner => "runner",
        }
    }

    /// Text each block starts out with
    fn header(&self) -> &'static str {
        match self {
            Block::Reactions => "% REACTION BLOCK\n",
            Block::Tracers => "% TRACERS BLOCK\n",
            Block::Fluxes => "% FLUXES BLOCK\n",
            Block::MsFragments => "% MS_FRAGMENTS BLOCK\n",
            Block::PoolSizes => "% POOL_SIZES BLOCK\n",
            Block::Experiments => "% EXPERIMENTAL_DATA BLOCK\n",
            Block::Model => "% MODEL BLOCK\n",
            Block::ModelModifications => "% MODEL MODIFICATIONS BLOCK\n",
            Block::Options => "% OPTIONS BLOCK\n",
            Block::VerifyModel => "mod2stoich(m); % make sure the fluxes are feasible",
            Block::Runner => "% RUNNER BLOCK\n",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for Block {
    type Err = ScriptError;

    /// Parse a block from its name, the feasibility check block is not addressable by name
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Block::ALL
            .iter()
            .filter(|block| **block != Block::VerifyModel)
            .find(|block| block.name() == name)
            .copied()
            .ok_or_else(|| ScriptError::UnknownBlock(name.to_string()))
    }
}

/// An INCA script under construction
///
/// Blocks can only be appended to. Rendering joins the preamble and all blocks in the order of
/// [`Block::ALL`], regardless of the order in which text was added.
///
/// # Examples
/// ```rust
/// use incars_core::script::document::{Block, ScriptDocument};
/// let mut script = ScriptDocument::new();
/// script.add_to_block(Block::Model, "m = model(r, 'expts', [e_exp1]);\n");
/// script.add_to_block(Block::Reactions, "r = [reaction('A -> B', 'id', 'r1')];\n");
/// let text = script.render();
/// assert!(text.find("r = [").unwrap() < text.find("m = model").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDocument {
    preamble: String,
    blocks: [String; 11],
}

impl ScriptDocument {
    /// Create a script where every block only holds its header
    pub fn new() -> Self {
        ScriptDocument {
            preamble: configuration::current().script_preamble,
            blocks: Block::ALL.map(|block| block.header().to_string()),
        }
    }

    /// Append text to a block
    pub fn add_to_block(&mut self, block: Block, text: &str) {
        self.blocks[block.index()].push_str(text);
    }

    /// Append text to a block given by name
    pub fn add_to_named_block(&mut self, block_name: &str, text: &str) -> Result<(), ScriptError> {
        let block = Block::from_str(block_name)?;
        self.add_to_block(block, text);
        Ok(())
    }

    /// Current content of a block, including its header
    pub fn block(&self, block: Block) -> &str {
        &self.blocks[block.index()]
    }

    /// Join the preamble and all blocks into the full script
    pub fn render(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.blocks.len() + 1);
        parts.push(&self.preamble);
        parts.extend(self.blocks.iter().map(|b| b.as_str()));
        parts.join("\n\n")
    }

    /// Write the rendered script to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScriptError> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

impl Default for ScriptDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ScriptDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}
