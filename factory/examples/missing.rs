use fibre_factory::{global, instance, FactoryError};
use std::panic;

fn main() {
  // --- Using the panicking `instance!` macro ---
  println!("Attempting to resolve an interface that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = instance!("IUnregisteredService");
  });

  assert!(result.is_err(), "instance! should have panicked.");
  println!("Successfully caught the expected panic from instance!.");

  // --- Using the fallible `get_instance()` method ---
  println!("\nNow, attempting to resolve using the fallible `get_instance()` method...");

  match global().get_instance("IUnregisteredService") {
    Err(FactoryError::UnregisteredInterface { interface }) => {
      println!("Correctly received an error for '{}'.", interface)
    }
    other => panic!("Should not have found the service! Got {:?}", other),
  }
}
