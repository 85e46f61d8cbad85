pub trait BrushSetter<Brush, T> {
    fn set_brush(&mut self, brush: &Brush, value: T);
}

pub trait BrushMaybeGetter<P, T> {
    fn maybe_get(&self, p: &P) -> Option<T>;
}
