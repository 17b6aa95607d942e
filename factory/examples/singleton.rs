use fibre_factory::{global, ClassDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  global().types().declare_class(
    ClassDescriptor::builder::<RequestTracker>("RequestTracker")
      .constructor(|_| {
        println!("Creating RequestTracker...");
        Ok(RequestTracker {
          id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
        })
      })
      .build(),
  );

  println!("--- Resolving Shared Instances ---");
  // The constructor only runs for the first request.
  let s1 = global().get_shared::<RequestTracker>("RequestTracker").unwrap();
  let s2 = global().get_shared::<RequestTracker>("RequestTracker").unwrap();
  println!("Shared 1 ID: {}, Shared 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert_eq!(s2.id, 0);

  println!("--- Resolving Transient Instances ---");
  // The constructor runs on every request.
  let t1 = global().get::<RequestTracker>("RequestTracker").unwrap();
  let t2 = global().get::<RequestTracker>("RequestTracker").unwrap();
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
}
