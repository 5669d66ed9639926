//! Message types generated from `maps.proto`.

use mapwire::registry::RegistryBuilder;
use mapwire::RegistryError;

pub mod test {
    include!("test.rs");
}

/// Registers every type and file of `maps.proto`.
///
/// ```ignore
/// mapwire::registry::init(|builder| mapwire_maps::register(builder))?;
/// ```
pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder.register_file(test::FILE_NAME, test::FILE_DESCRIPTOR)?;
    builder.register_type(&test::MAP_TEST_DESCRIPTOR, test::FILE_NAME, test::MAP_TEST_INDEX)?;
    Ok(())
}
