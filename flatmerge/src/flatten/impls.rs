//! [`Flatten`] implementations for standard library types.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use super::{FlatKind, FlatSink, Flatten};

macro_rules! flatten_scalar {
    ($kind:ident => $($ty:ty),+ $(,)?) => {$(
        impl Flatten for $ty {
            const KIND: FlatKind = FlatKind::$kind;

            fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
                sink.leaf(path, self.to_string());
            }

            fn scalar_text(&self) -> Option<String> {
                Some(self.to_string())
            }
        }
    )+};
}

flatten_scalar!(Bool => bool);
flatten_scalar!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
flatten_scalar!(Float => f32, f64);
flatten_scalar!(Char => char);
flatten_scalar!(String => String, str);

impl<T: Flatten> Flatten for Option<T> {
    const KIND: FlatKind = FlatKind::Option;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        if let Some(inner) = self {
            inner.flatten_into(path, sink);
        }
    }
}

impl<T: Flatten + ?Sized> Flatten for &T {
    const KIND: FlatKind = T::KIND;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        (**self).flatten_into(path, sink);
    }

    fn scalar_text(&self) -> Option<String> {
        (**self).scalar_text()
    }
}

impl<T: Flatten + ?Sized> Flatten for Box<T> {
    const KIND: FlatKind = T::KIND;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        (**self).flatten_into(path, sink);
    }

    fn scalar_text(&self) -> Option<String> {
        (**self).scalar_text()
    }
}

/// Render scalar items as `[a, b]`; composite items produce nothing.
fn flatten_items<T: Flatten>(items: &[T], path: &str, sink: &mut FlatSink<'_>) {
    if !T::KIND.is_scalar() {
        return;
    }
    let rendered: Option<Vec<String>> = items.iter().map(T::scalar_text).collect();
    if let Some(texts) = rendered {
        sink.leaf(path, format!("[{}]", texts.join(", ")));
    }
}

impl<T: Flatten> Flatten for [T] {
    const KIND: FlatKind = FlatKind::Sequence;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        flatten_items(self, path, sink);
    }
}

impl<T: Flatten> Flatten for Vec<T> {
    const KIND: FlatKind = FlatKind::Sequence;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        flatten_items(self, path, sink);
    }
}

impl<T: Flatten, const N: usize> Flatten for [T; N] {
    const KIND: FlatKind = FlatKind::Sequence;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        flatten_items(self, path, sink);
    }
}

impl<K: Display, V: Flatten, S> Flatten for HashMap<K, V, S> {
    const KIND: FlatKind = FlatKind::Map;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        for (key, value) in self {
            sink.entry(path, key, value);
        }
    }
}

impl<K: Display, V: Flatten> Flatten for BTreeMap<K, V> {
    const KIND: FlatKind = FlatKind::Map;

    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>) {
        for (key, value) in self {
            sink.entry(path, key, value);
        }
    }
}
