/// Source of candidate ports, normally the OS ephemeral range.
pub trait PortSource: Send + Sync {
    fn ephemeral_port(&self) -> std::io::Result<u16>;
}

/// Source of instance identifiers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}
