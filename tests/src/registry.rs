//! Process-wide registration of the generated types.

use anyhow::Result;
use mapwire::registry::{self, Registry};

/// Initializes the process-wide registry with every generated type, or
/// returns it if some earlier caller already did.
pub fn registry() -> Result<&'static Registry> {
    if let Some(registry) = registry::global() {
        return Ok(registry);
    }
    match registry::init(mapwire_maps::register) {
        Ok(registry) => Ok(registry),
        // Another thread won the race.
        Err(mapwire::RegistryError::AlreadyInitialized) => registry::global()
            .ok_or_else(|| anyhow::anyhow!("registry initialization raced and vanished")),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod test {
    use mapwire::registry::RegistryBuilder;
    use mapwire::{Name, RegistryError};
    use mapwire_maps::test::{MapTest, MAP_TEST_DESCRIPTOR};

    use super::*;
    use crate::init_logger;

    #[test]
    fn global_registry_is_written_once() {
        init_logger();
        let registry = registry().unwrap();
        assert!(std::ptr::eq(registry, registry::global().unwrap()));

        assert_eq!(
            registry::init(mapwire_maps::register).unwrap_err(),
            RegistryError::AlreadyInitialized
        );
        assert_eq!(
            registry::init(|_| Ok(())).unwrap_err(),
            RegistryError::AlreadyInitialized
        );
    }

    #[test]
    fn lookup_by_full_name() {
        let registry = registry().unwrap();
        let descriptor = registry.message(&MapTest::full_name()).unwrap();
        assert!(std::ptr::eq(descriptor, &MAP_TEST_DESCRIPTOR));
        assert_eq!(
            descriptor.field_by_name("integer_properties").map(|f| f.number),
            Some(3)
        );
        assert!(registry.type_names().any(|name| name == "test.MapTest"));
    }

    #[test]
    fn descriptor_bytes_match_registration() {
        let registry = registry().unwrap();
        let (gz, index) = MapTest::descriptor_bytes();
        assert_eq!(registry.file_descriptor_gz("maps.proto"), Some(gz));

        let (file, registered_index) = registry.descriptor_for_type("test.MapTest").unwrap();
        assert_eq!(registered_index, index);

        assert_eq!(file, registry.file_descriptor("maps.proto").unwrap());
        let text = String::from_utf8_lossy(&file);
        for needle in ["maps.proto", "MapTest", "PropertiesEntry", "integer_properties"] {
            assert!(text.contains(needle), "missing {:?}", needle);
        }
    }

    #[test]
    fn duplicate_type_registration_is_rejected() {
        let mut builder = RegistryBuilder::new();
        mapwire_maps::register(&mut builder).unwrap();
        let error = builder
            .register_type(&MAP_TEST_DESCRIPTOR, "other.proto", &[0])
            .unwrap_err();
        assert_eq!(
            error,
            RegistryError::DuplicateType {
                name: "test.MapTest".to_string()
            }
        );
        assert_eq!(
            error.to_string(),
            "message type \"test.MapTest\" is already registered"
        );
    }
}
