//! The cactus stack: a stack of tag-labelled segments of continuation
//! frames.
//!
//! All control-flow state of the reducer lives here. Structural descent and
//! function application push [`Frame`]s onto the top segment; `reset tag`
//! pushes a fresh segment labelled `tag` (the delimiter); `shift tag`
//! splices out every frame above the nearest `tag` segment boundary as a
//! captured [`Segment`]. Normal returns pop frames and silently drop
//! segments as they empty, which is what consumes a delimiter on the way
//! out.

use smallvec::SmallVec;

use crate::{
    env::Env,
    intern::NameId,
    value::{Ins, Value},
};

/// One suspended reduction step.
///
/// `kind` is the sub-instruction pointer to restore; the triple and `env`
/// are the state to re-enter it with. `Return` frames only use `env`.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub kind: Ins,
    pub left: Value,
    pub head: Value,
    pub right: Value,
    pub env: Env,
}

impl Frame {
    pub fn new(kind: Ins, left: Value, head: Value, right: Value, env: Env) -> Self {
        Self {
            kind,
            left,
            head,
            right,
            env,
        }
    }

    /// The bottom-of-stack frame that yields the final value.
    pub fn return_frame(env: Env) -> Self {
        Self::new(Ins::Return, Value::unit(), Value::unit(), Value::unit(), env)
    }
}

/// A run of frames delimited by a `reset` boundary carrying its tag.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub tag: NameId,
    frames: SmallVec<[Frame; 4]>,
}

impl Segment {
    fn new(tag: NameId) -> Self {
        Self {
            tag,
            frames: SmallVec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// The stack of segments.
#[derive(Debug)]
pub(crate) struct Cactus {
    rope: Vec<Segment>,
    frame_count: usize,
}

impl Cactus {
    /// Creates a cactus with a single empty segment labelled `root`.
    pub fn new(root: NameId) -> Self {
        Self {
            rope: vec![Segment::new(root)],
            frame_count: 0,
        }
    }

    /// Total number of live frames across all segments.
    pub fn depth(&self) -> usize {
        self.frame_count
    }

    /// Installs a delimiter: a fresh empty segment labelled `tag`.
    pub fn spush(&mut self, tag: NameId) {
        self.rope.push(Segment::new(tag));
    }

    /// Captures everything above the nearest `tag` delimiter.
    ///
    /// All frames from the matching segment and every segment above it are
    /// spliced out, in order, into a single returned segment labelled `tag`;
    /// the delimiter itself is consumed. Returns `None` when no segment
    /// carries `tag`.
    pub fn spop(&mut self, tag: NameId) -> Option<Segment> {
        let index = self.rope.iter().rposition(|segment| segment.tag == tag)?;
        let mut captured = Segment::new(tag);
        for segment in self.rope.drain(index..) {
            captured.frames.extend(segment.frames);
        }
        self.frame_count -= captured.frames.len();
        Some(captured)
    }

    /// Reinstalls a copy of a captured segment, delimiter included.
    pub fn scopy(&mut self, segment: &Segment) {
        self.frame_count += segment.frames.len();
        self.rope.push(segment.clone());
    }

    /// Pushes a frame onto the top segment.
    pub fn push(&mut self, frame: Frame) {
        self.frame_count += 1;
        self.rope
            .last_mut()
            .expect("cactus always has a root segment")
            .frames
            .push(frame);
    }

    /// The top frame of the top segment, if any.
    ///
    /// Does not skip empty segments: a delimiter boundary hides the frames
    /// below it, which keeps tail-call flattening from reusing a frame
    /// across a `reset`.
    pub fn peek(&self) -> Option<&Frame> {
        self.rope.last().and_then(|segment| segment.frames.last())
    }

    /// Pops the next frame, dropping empty segments (and with them their
    /// delimiters) along the way. Returns `None` when no frames are left.
    pub fn pop(&mut self) -> Option<Frame> {
        while self.rope.last().is_some_and(Segment::is_empty) {
            if self.rope.len() == 1 {
                return None;
            }
            self.rope.pop();
        }
        let frame = self.rope.last_mut()?.frames.pop()?;
        self.frame_count -= 1;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::{Interner, StaticNames};

    fn frame(env: &Env) -> Frame {
        Frame::new(Ins::Left, Value::unit(), Value::unit(), Value::unit(), env.clone())
    }

    #[test]
    fn pop_skips_empty_segments() {
        let mut interner = Interner::new();
        let env = Env::root();
        let mut cactus = Cactus::new(StaticNames::RootTag.id());
        cactus.push(frame(&env));
        cactus.spush(interner.intern("k"));
        cactus.spush(interner.intern("j"));
        let popped = cactus.pop().unwrap();
        assert_eq!(popped.kind, Ins::Left);
        assert_eq!(cactus.depth(), 0);
    }

    #[test]
    fn spop_captures_across_nested_delimiters() {
        let mut interner = Interner::new();
        let k = interner.intern("k");
        let j = interner.intern("j");
        let env = Env::root();
        let mut cactus = Cactus::new(StaticNames::RootTag.id());
        cactus.push(frame(&env));
        cactus.spush(k);
        cactus.push(frame(&env));
        cactus.spush(j);
        cactus.push(frame(&env));

        let captured = cactus.spop(k).unwrap();
        assert_eq!(captured.len(), 2, "frames above the k delimiter, j's included");
        assert_eq!(captured.tag, k);
        assert_eq!(cactus.depth(), 1, "only the root frame remains");
    }

    #[test]
    fn spop_without_matching_tag_fails() {
        let mut interner = Interner::new();
        let mut cactus = Cactus::new(StaticNames::RootTag.id());
        assert!(cactus.spop(interner.intern("missing")).is_none());
    }

    #[test]
    fn peek_stops_at_delimiter() {
        let mut interner = Interner::new();
        let env = Env::root();
        let mut cactus = Cactus::new(StaticNames::RootTag.id());
        cactus.push(frame(&env));
        cactus.spush(interner.intern("k"));
        assert!(cactus.peek().is_none(), "a fresh delimiter hides frames below it");
    }

    #[test]
    fn scopy_is_reusable() {
        let mut interner = Interner::new();
        let k = interner.intern("k");
        let env = Env::root();
        let mut cactus = Cactus::new(StaticNames::RootTag.id());
        cactus.spush(k);
        cactus.push(frame(&env));
        let captured = cactus.spop(k).unwrap();

        cactus.scopy(&captured);
        cactus.scopy(&captured);
        assert_eq!(cactus.depth(), 2, "each reinstall is an independent copy");
    }
}
