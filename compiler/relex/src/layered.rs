//! Re-scanning selected base tokens with secondary lexers.
//!
//! A [`LayeredLexer`] forwards its base lexer's tokens until the base
//! produces a registered trigger type. It then starts the registered layer
//! lexer over that token's range and yields the layer's tokens instead.
//!
//! Two kinds of layer exist:
//!
//! - An ordinary layer runs to exhaustion, then the base resumes after the
//!   triggering token.
//! - A self-stopping layer finishes early when it yields one of its stop
//!   tokens. The base is advanced at activation.
//!
//! Whenever a layer finishes short of the triggering token's end, the
//! uncovered tail is emitted as one gap token of the trigger's type so
//! the stream still covers the whole range.
//!
//! # State
//!
//! Only positions outside a layer can be resumed. The first token of a
//! layer reports the base state at the trigger, so restarting there
//! re-activates the layer. Later layer tokens and gap tokens carry flag
//! bits; restoring to them is a contract violation and panics. The same
//! holds for a base state that reaches into the flag bits, which is
//! reported with both flags set.

use relex_core::{Lexer, LexerPosition, SourceBuffer, TokenSet, TokenType};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::LayerError;

/// Construction-time options for a [`LayeredLexer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayeredConfig {
    /// When `false`, triggers are ignored and the base stream passes through.
    pub layers_enabled: bool,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            layers_enabled: true,
        }
    }
}

impl LayeredConfig {
    #[must_use]
    pub fn with_layers_enabled(mut self, enabled: bool) -> Self {
        self.layers_enabled = enabled;
        self
    }
}

/// Decoded form of the state integer reported by [`LayeredLexer::state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayeredState {
    Base(u32),
    InLayer(u32),
    InGap(u32),
    /// The base state overlaps the flag bits.
    Unresumable,
}

impl LayeredState {
    const IN_LAYER: u32 = 1 << 31;
    const IN_GAP: u32 = 1 << 30;
    const BASE_MASK: u32 = Self::IN_GAP - 1;

    fn base(state: u32) -> Self {
        if state <= Self::BASE_MASK {
            LayeredState::Base(state)
        } else {
            LayeredState::Unresumable
        }
    }

    fn encode(self) -> u32 {
        match self {
            LayeredState::Base(state) => state,
            LayeredState::InLayer(state) => Self::IN_LAYER | (state & Self::BASE_MASK),
            LayeredState::InGap(state) => Self::IN_GAP | (state & Self::BASE_MASK),
            LayeredState::Unresumable => Self::IN_LAYER | Self::IN_GAP,
        }
    }

    fn decode(raw: u32) -> Self {
        if raw & (Self::IN_LAYER | Self::IN_GAP) == Self::IN_LAYER | Self::IN_GAP {
            LayeredState::Unresumable
        } else if raw & Self::IN_LAYER != 0 {
            LayeredState::InLayer(raw & Self::BASE_MASK)
        } else if raw & Self::IN_GAP != 0 {
            LayeredState::InGap(raw & Self::BASE_MASK)
        } else {
            LayeredState::Base(raw)
        }
    }
}

enum LayerKind {
    Ordinary,
    SelfStopping { stop_tokens: TokenSet },
}

struct Layer {
    lexer: Box<dyn Lexer>,
    kind: LayerKind,
}

impl Layer {
    fn is_self_stopping(&self) -> bool {
        matches!(self.kind, LayerKind::SelfStopping { .. })
    }

    fn at_stop_token(&self) -> bool {
        match &self.kind {
            LayerKind::Ordinary => false,
            LayerKind::SelfStopping { stop_tokens } => {
                stop_tokens.contains_opt(self.lexer.token_type())
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveLayer {
    index: usize,
    base_token_type: TokenType,
    base_token_end: u32,
    base_state: u32,
    /// The layer sits on its first token.
    first: bool,
}

/// Tail of a triggering token the layer did not cover.
#[derive(Clone, Copy, Debug)]
struct Gap {
    token_type: TokenType,
    start: u32,
    end: u32,
    base_state: u32,
    /// Ordinary layers leave the base on the triggering token.
    advance_base: bool,
}

/// A [`Lexer`] that hands selected base tokens to secondary lexers.
pub struct LayeredLexer<L> {
    base: L,
    config: LayeredConfig,
    /// Indexed by the values of `triggers`.
    layers: SmallVec<[Layer; 2]>,
    triggers: FxHashMap<TokenType, usize>,
    active: Option<ActiveLayer>,
    gap: Option<Gap>,
}

impl<L: Lexer> LayeredLexer<L> {
    pub fn new(base: L) -> Self {
        Self::with_config(base, LayeredConfig::default())
    }

    pub fn with_config(base: L, config: LayeredConfig) -> Self {
        Self {
            base,
            config,
            layers: SmallVec::new(),
            triggers: FxHashMap::default(),
            active: None,
            gap: None,
        }
    }

    /// Re-scan tokens of the `triggers` types with `lexer`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::DuplicateTrigger`] if any trigger already has a
    /// layer. Nothing is registered in that case.
    pub fn register_layer<T>(&mut self, lexer: T, triggers: &[TokenType]) -> Result<(), LayerError>
    where
        T: Lexer + 'static,
    {
        self.insert_layer(Box::new(lexer), LayerKind::Ordinary, triggers)
    }

    /// Like [`register_layer`](Self::register_layer), but the layer ends
    /// after yielding any of `stop_tokens`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::DuplicateTrigger`] if any trigger already has a
    /// layer. Nothing is registered in that case.
    pub fn register_self_stopping_layer<T>(
        &mut self,
        lexer: T,
        triggers: &[TokenType],
        stop_tokens: TokenSet,
    ) -> Result<(), LayerError>
    where
        T: Lexer + 'static,
    {
        self.insert_layer(
            Box::new(lexer),
            LayerKind::SelfStopping { stop_tokens },
            triggers,
        )
    }

    fn insert_layer(
        &mut self,
        lexer: Box<dyn Lexer>,
        kind: LayerKind,
        triggers: &[TokenType],
    ) -> Result<(), LayerError> {
        for (i, &trigger) in triggers.iter().enumerate() {
            if self.triggers.contains_key(&trigger) || triggers[..i].contains(&trigger) {
                return Err(LayerError::DuplicateTrigger(trigger));
            }
        }
        let index = self.layers.len();
        self.layers.push(Layer { lexer, kind });
        self.triggers
            .extend(triggers.iter().map(|&trigger| (trigger, index)));
        Ok(())
    }

    /// Returns `true` while the current token comes from a layer.
    pub fn is_layer_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns `true` if `position` lies outside any layer and its base
    /// state was encodable.
    pub fn can_restore(&self, position: &LexerPosition) -> bool {
        matches!(LayeredState::decode(position.state()), LayeredState::Base(_))
    }

    pub fn base(&self) -> &L {
        &self.base
    }

    pub fn config(&self) -> LayeredConfig {
        self.config
    }

    /// Forward the base's current token, activating a layer if it triggers one.
    fn sync_with_base(&mut self) {
        self.active = None;
        if !self.config.layers_enabled {
            return;
        }
        let Some(token_type) = self.base.token_type() else {
            return;
        };
        if let Some(&index) = self.triggers.get(&token_type) {
            self.activate(index, token_type);
        }
    }

    fn activate(&mut self, index: usize, base_token_type: TokenType) {
        let start = self.base.token_start();
        let end = self.base.token_end();
        let base_state = self.base.state();
        let buffer = self.base.buffer().clone();

        let layer = &mut self.layers[index];
        layer.lexer.start(buffer, start, end, 0);
        if layer.lexer.token_type().is_none() {
            return;
        }
        if layer.is_self_stopping() {
            self.base.advance();
        }
        trace!(layer = index, trigger = %base_token_type, start, end, "layer activated");
        self.active = Some(ActiveLayer {
            index,
            base_token_type,
            base_token_end: end,
            base_state,
            first: true,
        });
    }

    fn advance_layer(&mut self, mut active: ActiveLayer) {
        let layer = &mut self.layers[active.index];
        let covered_end = layer.lexer.token_end();
        if !layer.at_stop_token() {
            layer.lexer.advance();
            if layer.lexer.token_type().is_some() {
                active.first = false;
                self.active = Some(active);
                return;
            }
        }

        let ordinary = !layer.is_self_stopping();
        self.active = None;
        trace!(layer = active.index, end = covered_end, "layer finished");
        if covered_end < active.base_token_end {
            debug!(
                trigger = %active.base_token_type,
                start = covered_end,
                end = active.base_token_end,
                "layer left a gap"
            );
            self.gap = Some(Gap {
                token_type: active.base_token_type,
                start: covered_end,
                end: active.base_token_end,
                base_state: active.base_state,
                advance_base: ordinary,
            });
            return;
        }
        if ordinary {
            self.base.advance();
        }
        self.sync_with_base();
    }

    fn active_lexer(&self, active: &ActiveLayer) -> &dyn Lexer {
        self.layers[active.index].lexer.as_ref()
    }
}

impl<L: Lexer> Lexer for LayeredLexer<L> {
    /// # Panics
    ///
    /// Panics if `initial_state` was reported inside a layer, or for a base
    /// state too wide to encode.
    fn start(&mut self, buffer: SourceBuffer, start_offset: u32, end_offset: u32, initial_state: u32) {
        let base_state = match LayeredState::decode(initial_state) {
            LayeredState::Base(state) => state,
            inside => panic!("cannot resume a layered lexer inside a layer: {inside:?}"),
        };
        self.gap = None;
        self.base
            .start(buffer, start_offset, end_offset, base_state);
        self.sync_with_base();
    }

    fn advance(&mut self) {
        if let Some(gap) = self.gap.take() {
            if gap.advance_base {
                self.base.advance();
            }
            self.sync_with_base();
        } else if let Some(active) = self.active {
            self.advance_layer(active);
        } else {
            self.base.advance();
            self.sync_with_base();
        }
    }

    fn token_type(&self) -> Option<TokenType> {
        if let Some(gap) = &self.gap {
            Some(gap.token_type)
        } else if let Some(active) = &self.active {
            self.active_lexer(active).token_type()
        } else {
            self.base.token_type()
        }
    }

    fn token_start(&self) -> u32 {
        if let Some(gap) = &self.gap {
            gap.start
        } else if let Some(active) = &self.active {
            self.active_lexer(active).token_start()
        } else {
            self.base.token_start()
        }
    }

    fn token_end(&self) -> u32 {
        if let Some(gap) = &self.gap {
            gap.end
        } else if let Some(active) = &self.active {
            self.active_lexer(active).token_end()
        } else {
            self.base.token_end()
        }
    }

    fn state(&self) -> u32 {
        let state = if let Some(gap) = &self.gap {
            LayeredState::InGap(gap.base_state)
        } else if let Some(active) = &self.active {
            if active.first {
                LayeredState::base(active.base_state)
            } else {
                LayeredState::InLayer(active.base_state)
            }
        } else {
            LayeredState::base(self.base.state())
        };
        state.encode()
    }

    fn buffer(&self) -> &SourceBuffer {
        self.base.buffer()
    }

    fn buffer_end(&self) -> u32 {
        self.base.buffer_end()
    }
}
