cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", target_env = "gnu"))] {
        pub type Context = arch_ucontext::UContext;
    } else {
        compile_error!("no execution context backend for this target");
    }
}
