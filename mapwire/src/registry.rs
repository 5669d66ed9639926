//! Process-wide registry of message types and their file descriptors.
//!
//! Registration is a distinct initialization phase. Generated crates expose a
//! `register` function which is handed a [`RegistryBuilder`] inside
//! [`init`]; once `init` returns, the resulting [`Registry`] is published and
//! never changes again. Lookups before initialization see no registry at all,
//! so every registration completes before the first lookup can succeed.
//!
//! ```
//! use mapwire::descriptor::{FieldDescriptor, MessageDescriptor, ScalarKind};
//! use mapwire::registry::RegistryBuilder;
//!
//! static FIELDS: &[FieldDescriptor] = &[FieldDescriptor::scalar(1, "id", ScalarKind::Uint64)];
//! static DESCRIPTOR: MessageDescriptor = MessageDescriptor::new("doc.Item", FIELDS);
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register_file("doc.proto", &[]).unwrap();
//! builder.register_type(&DESCRIPTOR, "doc.proto", &[0]).unwrap();
//! let registry = builder.build().unwrap();
//! assert_eq!(registry.message("doc.Item"), Some(&DESCRIPTOR));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};

use flate2::bufread::GzDecoder;
use log::debug;
use once_cell::sync::OnceCell;

use crate::descriptor::MessageDescriptor;
use crate::RegistryError;

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Where a registered message type is declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRegistration {
    descriptor: &'static MessageDescriptor,
    file: &'static str,
    index: &'static [usize],
}

impl TypeRegistration {
    pub fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    /// The name of the `.proto` file declaring the type.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Path of message indexes locating the type within its file descriptor.
    pub fn index(&self) -> &'static [usize] {
        self.index
    }
}

/// Collects registrations during the initialization phase.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: HashMap<&'static str, TypeRegistration>,
    files: HashMap<&'static str, &'static [u8]>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Registers a message type under its fully-qualified name.
    ///
    /// The descriptor is validated first. Registering a second type with the
    /// same name fails with [`RegistryError::DuplicateType`].
    pub fn register_type(
        &mut self,
        descriptor: &'static MessageDescriptor,
        file: &'static str,
        index: &'static [usize],
    ) -> Result<&mut Self, RegistryError> {
        descriptor.validate()?;
        if self.types.contains_key(descriptor.full_name) {
            return Err(RegistryError::DuplicateType {
                name: descriptor.full_name.to_string(),
            });
        }

        debug!("registering type {} from {}", descriptor.full_name, file);
        self.types.insert(
            descriptor.full_name,
            TypeRegistration {
                descriptor,
                file,
                index,
            },
        );
        Ok(self)
    }

    /// Registers the gzipped `FileDescriptorProto` of a `.proto` file.
    pub fn register_file(
        &mut self,
        name: &'static str,
        descriptor_gz: &'static [u8],
    ) -> Result<&mut Self, RegistryError> {
        if self.files.contains_key(name) {
            return Err(RegistryError::DuplicateFile {
                name: name.to_string(),
            });
        }

        debug!(
            "registering file {} ({} compressed bytes)",
            name,
            descriptor_gz.len()
        );
        self.files.insert(name, descriptor_gz);
        Ok(self)
    }

    /// Finishes registration.
    ///
    /// Types and files may be registered in any order, but every type must
    /// name a registered file by the time the registry is built.
    pub fn build(self) -> Result<Registry, RegistryError> {
        // Check in name order so the reported error does not depend on hashing.
        let types: BTreeMap<_, _> = self.types.into_iter().collect();
        for registration in types.values() {
            if !self.files.contains_key(registration.file) {
                return Err(RegistryError::UnknownFile {
                    type_name: registration.descriptor.full_name.to_string(),
                    file: registration.file.to_string(),
                });
            }
        }

        Ok(Registry {
            types,
            files: self.files,
        })
    }
}

/// An immutable set of registered types and files.
#[derive(Debug)]
pub struct Registry {
    types: BTreeMap<&'static str, TypeRegistration>,
    files: HashMap<&'static str, &'static [u8]>,
}

impl Registry {
    /// Looks up a message descriptor by fully-qualified name.
    pub fn message(&self, full_name: &str) -> Option<&'static MessageDescriptor> {
        self.type_registration(full_name)
            .map(|registration| registration.descriptor)
    }

    pub fn type_registration(&self, full_name: &str) -> Option<&TypeRegistration> {
        self.types.get(full_name)
    }

    /// Registered type names in ascending order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    /// The compressed descriptor of a file, exactly as registered.
    pub fn file_descriptor_gz(&self, file: &str) -> Option<&'static [u8]> {
        self.files.get(file).copied()
    }

    /// Decompresses the serialized `FileDescriptorProto` of a file.
    ///
    /// Fails with [`io::ErrorKind::NotFound`] for unknown files.
    pub fn file_descriptor(&self, file: &str) -> io::Result<Vec<u8>> {
        let compressed = self.file_descriptor_gz(file).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file descriptor {:?} is not registered", file),
            )
        })?;

        let mut descriptor = Vec::new();
        GzDecoder::new(compressed).read_to_end(&mut descriptor)?;
        Ok(descriptor)
    }

    /// Returns the decompressed file descriptor declaring a type, along with
    /// the index path of the type inside it.
    pub fn descriptor_for_type(
        &self,
        full_name: &str,
    ) -> io::Result<(Vec<u8>, &'static [usize])> {
        let registration = self.type_registration(full_name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("message type {:?} is not registered", full_name),
            )
        })?;
        let descriptor = self.file_descriptor(registration.file)?;
        Ok((descriptor, registration.index))
    }
}

/// Runs the initialization phase and publishes the process-wide registry.
///
/// `register` is given a fresh builder. The registry is published only if
/// every registration succeeds. Initialization happens at most once per
/// process; later calls fail with [`RegistryError::AlreadyInitialized`].
pub fn init<F>(register: F) -> Result<&'static Registry, RegistryError>
where
    F: FnOnce(&mut RegistryBuilder) -> Result<(), RegistryError>,
{
    if GLOBAL.get().is_some() {
        return Err(RegistryError::AlreadyInitialized);
    }

    let mut builder = RegistryBuilder::new();
    register(&mut builder)?;
    let registry = builder.build()?;

    match GLOBAL.try_insert(registry) {
        Ok(registry) => {
            debug!(
                "registry initialized with {} types and {} files",
                registry.types.len(),
                registry.files.len()
            );
            Ok(registry)
        }
        Err(_) => Err(RegistryError::AlreadyInitialized),
    }
}

/// Returns the process-wide registry, or `None` before [`init`] has run.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}
