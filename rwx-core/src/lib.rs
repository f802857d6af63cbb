//! Data model shared by RWX containers and clients: RESTful resources
//! addressed over XMPP.

pub mod document;
pub mod envelope;
pub mod error;
pub mod representation;
pub mod uri;
pub mod value;
pub mod wire;
pub mod xwadl;

pub use document::{ActionInvocation, MethodInvocation, Parameter, Payload, ProtocolDocument};
pub use envelope::{Body, DiscoItems, Envelope, EnvelopeError, IdGenerator, StanzaType};
pub use error::{ConfigError, DispatchError, ErrorCode, RepresentationError};
pub use representation::{
    Codec, CodecRegistry, JsonCodec, PlainTextCodec, Representation, UriListCodec,
    APPLICATION_JSON, TEXT_PLAIN, TEXT_URI_LIST,
};
pub use uri::{UriError, XmppUri};
pub use value::{NativeValue, ParameterType, TypedValue, ValueError};
pub use wire::{decode_envelope, decode_frame, encode_envelope, encode_frame, FrameFormat, WireError};
pub use xwadl::{
    ActionNode, CapabilityDocument, Documentation, ExtensionNode, MethodNode, ParameterNode,
    RequestNode, ResponseNode, ResultNode,
};
