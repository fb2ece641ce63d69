mod credentials;

pub use credentials::CredentialsRepository;
