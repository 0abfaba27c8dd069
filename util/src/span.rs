pub type Span = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub loc: Span
}

impl<T> Spanned<T> {
    #[inline]
    pub fn new(item : T, loc : Span) -> Self {
        Self {
            item,
            loc
        }
    }
}

pub trait ToSpanned: Sized {
    fn with_span(self, loc: Span) -> Spanned<Self> {
        Spanned::new(self, loc)
    }

    // for nodes built by hand, e.g. in tests
    fn no_span(self) -> Spanned<Self> {
        Spanned::new(self, (0, 0))
    }
}

impl<T> ToSpanned for T {}
