//! Support for associating type name information with a [`Message`].

use crate::Message;

/// Associate a type name with a [`Message`] type.
pub trait Name: Message {
    /// Simple name for this [`Message`].
    /// This name is the same as it appears in the source .proto file, e.g. `FooBar`.
    const NAME: &'static str;

    /// Package name this message type is contained in. They are domain-like
    /// and delimited by `.`, e.g. `google.protobuf`.
    const PACKAGE: &'static str;

    /// Fully-qualified unique name for this [`Message`].
    /// By default, this is the package name followed by the message name.
    /// Fully-qualified names are the keys of the type registry.
    fn full_name() -> String {
        if Self::PACKAGE.is_empty() {
            Self::NAME.to_owned()
        } else {
            format!("{}.{}", Self::PACKAGE, Self::NAME)
        }
    }

    /// Type URL for this [`Message`], which by default is the full name with a
    /// leading slash, e.g. `/test.MapTest`.
    fn type_url() -> String {
        format!("/{}", Self::full_name())
    }
}
