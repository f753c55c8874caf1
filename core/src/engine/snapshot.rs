// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Versioned encoding of the resumable negotiation snapshot
//!
//! The snapshot is the opaque `fsm_state` blob persisted inside a
//! [TxDescription][crate::description::TxDescription]: a version tag, the
//! machine's sub-state and the accumulated negotiation values. Persistence
//! itself is delegated to an external store; only the codec is defined
//! here.

use curve25519_dalek::ristretto::CompressedRistretto;
use encdec::{DecodeOwned, Encode};

use tandem_wire::{
    helpers::{list, pt, scalar},
    tx::TxKernel,
    Error as WireError,
};

use super::{Context, Error, Round, State};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u8 = 0x01;

/// Map an engine state to its persistent tag
fn state_tag(state: State) -> u8 {
    match state {
        State::Created => 0x00,
        State::Invited => 0x01,
        State::Negotiating(Round::ExcessExchanged) => 0x10,
        State::Negotiating(Round::SignatureExchanged) => 0x11,
        State::Registering => 0x20,
        State::Registered => 0x21,
        State::Completed => 0x30,
        State::Cancelled => 0x31,
        State::Failed => 0x3f,
    }
}

/// Map a persistent tag back to an engine state
fn tag_state(tag: u8) -> Result<State, Error> {
    let state = match tag {
        0x00 => State::Created,
        0x01 => State::Invited,
        0x10 => State::Negotiating(Round::ExcessExchanged),
        0x11 => State::Negotiating(Round::SignatureExchanged),
        0x20 => State::Registering,
        0x21 => State::Registered,
        0x30 => State::Completed,
        0x31 => State::Cancelled,
        0x3f => State::Failed,
        _ => return Err(Error::Decode(WireError::InvalidEncoding)),
    };

    Ok(state)
}

/// Encode a negotiation snapshot
pub(crate) fn encode(state: State, ctx: Option<&Context>) -> Result<Vec<u8>, Error> {
    let mut buff = Vec::new();

    buff.push(SNAPSHOT_VERSION);
    buff.push(state_tag(state));

    let ctx = match ctx {
        Some(c) => c,
        None => {
            buff.push(0);
            return Ok(buff);
        }
    };
    buff.push(1);

    buff.extend_from_slice(ctx.blinding_excess.as_bytes());
    buff.extend_from_slice(ctx.offset.as_bytes());
    buff.extend_from_slice(ctx.nonce.as_bytes());
    buff.extend_from_slice(ctx.public_excess.compress().as_bytes());
    buff.extend_from_slice(ctx.public_nonce.compress().as_bytes());

    put_opt_point(&mut buff, ctx.peer_public_excess.map(|p| p.compress()));
    put_opt_point(&mut buff, ctx.peer_public_nonce.map(|p| p.compress()));

    put_list(&mut buff, &ctx.inputs)?;
    put_list(&mut buff, &ctx.outputs)?;
    put_list(&mut buff, &ctx.peer_inputs)?;
    put_list(&mut buff, &ctx.peer_outputs)?;

    match &ctx.kernel {
        None => buff.push(0),
        Some(k) => {
            buff.push(1);
            let start = buff.len();
            buff.resize(start + k.encode_len()?, 0);
            k.encode(&mut buff[start..])?;
        }
    }

    Ok(buff)
}

/// Decode a negotiation snapshot
pub(crate) fn decode(buff: &[u8]) -> Result<(State, Option<Context>), Error> {
    if buff.len() < 3 {
        return Err(Error::Decode(WireError::InvalidLength));
    }

    if buff[0] != SNAPSHOT_VERSION {
        return Err(Error::Decode(WireError::InvalidEncoding));
    }

    let state = tag_state(buff[1])?;

    match buff[2] {
        0 => {
            if buff.len() != 3 {
                return Err(Error::Decode(WireError::InvalidLength));
            }
            return Ok((state, None));
        }
        1 => (),
        _ => return Err(Error::Decode(WireError::InvalidEncoding)),
    }

    let mut index = 3;

    let (blinding_excess, n) = scalar::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;
    let (offset, n) = scalar::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;
    let (nonce, n) = scalar::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;

    let (public_excess, n) = get_point(&buff[index..])?;
    index += n;
    let (public_nonce, n) = get_point(&buff[index..])?;
    index += n;

    let (peer_public_excess, n) = get_opt_point(&buff[index..])?;
    index += n;
    let (peer_public_nonce, n) = get_opt_point(&buff[index..])?;
    index += n;

    let (inputs, n) = list::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;
    let (outputs, n) = list::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;
    let (peer_inputs, n) = list::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;
    let (peer_outputs, n) = list::dec(&buff[index..]).map_err(Error::Decode)?;
    index += n;

    if buff.len() < index + 1 {
        return Err(Error::Decode(WireError::InvalidLength));
    }
    let kernel = match buff[index] {
        0 => {
            index += 1;
            None
        }
        1 => {
            index += 1;
            let (k, n) = TxKernel::decode_owned(&buff[index..]).map_err(Error::Decode)?;
            index += n;
            Some(k)
        }
        _ => return Err(Error::Decode(WireError::InvalidEncoding)),
    };

    if index != buff.len() {
        return Err(Error::Decode(WireError::InvalidLength));
    }

    Ok((
        state,
        Some(Context {
            blinding_excess,
            offset,
            nonce,
            public_excess,
            public_nonce,
            peer_public_excess,
            peer_public_nonce,
            inputs,
            outputs,
            peer_inputs,
            peer_outputs,
            kernel,
        }),
    ))
}

fn put_opt_point(buff: &mut Vec<u8>, p: Option<CompressedRistretto>) {
    match p {
        None => buff.push(0),
        Some(p) => {
            buff.push(1);
            buff.extend_from_slice(p.as_bytes());
        }
    }
}

fn put_list<T>(buff: &mut Vec<u8>, items: &[T]) -> Result<(), Error>
where
    T: Encode<Error = WireError>,
{
    let n = list::enc_len(items)?;
    let start = buff.len();
    buff.resize(start + n, 0);
    list::enc(items, &mut buff[start..])?;
    Ok(())
}

fn get_point(
    buff: &[u8],
) -> Result<(curve25519_dalek::ristretto::RistrettoPoint, usize), Error> {
    let (p, n) = pt::dec(buff).map_err(Error::Decode)?;
    let p = p.decompress().ok_or(Error::InvalidKey)?;
    Ok((p, n))
}

fn get_opt_point(
    buff: &[u8],
) -> Result<(Option<curve25519_dalek::ristretto::RistrettoPoint>, usize), Error> {
    if buff.is_empty() {
        return Err(Error::Decode(WireError::InvalidLength));
    }

    match buff[0] {
        0 => Ok((None, 1)),
        1 => {
            let (p, n) = get_point(&buff[1..])?;
            Ok((Some(p), n + 1))
        }
        _ => Err(Error::Decode(WireError::InvalidEncoding)),
    }
}

#[cfg(test)]
mod test {
    use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT, scalar::Scalar};
    use rand_core::OsRng;

    use tandem_wire::tx::{Input, Output, Signature};

    use super::*;

    fn build_context() -> Context {
        let g = RISTRETTO_BASEPOINT_POINT;

        let blinding_excess = Scalar::random(&mut OsRng {});
        let nonce = Scalar::random(&mut OsRng {});
        let peer = Scalar::random(&mut OsRng {});

        Context {
            blinding_excess,
            offset: Scalar::random(&mut OsRng {}),
            nonce,
            public_excess: blinding_excess * g,
            public_nonce: nonce * g,
            peer_public_excess: Some(peer * g),
            peer_public_nonce: None,
            inputs: vec![Input {
                commitment: (Scalar::random(&mut OsRng {}) * g).compress(),
            }],
            outputs: vec![Output {
                commitment: (Scalar::random(&mut OsRng {}) * g).compress(),
            }],
            peer_inputs: Vec::new(),
            peer_outputs: vec![Output {
                commitment: (Scalar::random(&mut OsRng {}) * g).compress(),
            }],
            kernel: Some(TxKernel {
                excess: (peer * g).compress(),
                fee: 10,
                min_height: 25,
                signature: Signature {
                    nonce: (nonce * g).compress(),
                    s: Scalar::random(&mut OsRng {}),
                },
            }),
        }
    }

    #[test]
    fn snapshot_roundtrip() {
        let ctx = build_context();
        let state = State::Negotiating(Round::ExcessExchanged);

        let blob = encode(state, Some(&ctx)).unwrap();
        let (decoded_state, decoded_ctx) = decode(&blob).unwrap();
        let decoded_ctx = decoded_ctx.unwrap();

        assert_eq!(decoded_state, state);
        assert_eq!(decoded_ctx.blinding_excess, ctx.blinding_excess);
        assert_eq!(decoded_ctx.offset, ctx.offset);
        assert_eq!(decoded_ctx.nonce, ctx.nonce);
        assert_eq!(decoded_ctx.public_excess, ctx.public_excess);
        assert_eq!(decoded_ctx.public_nonce, ctx.public_nonce);
        assert_eq!(decoded_ctx.peer_public_excess, ctx.peer_public_excess);
        assert_eq!(decoded_ctx.peer_public_nonce, ctx.peer_public_nonce);
        assert_eq!(decoded_ctx.inputs, ctx.inputs);
        assert_eq!(decoded_ctx.outputs, ctx.outputs);
        assert_eq!(decoded_ctx.peer_inputs, ctx.peer_inputs);
        assert_eq!(decoded_ctx.peer_outputs, ctx.peer_outputs);
        assert_eq!(decoded_ctx.kernel, ctx.kernel);
    }

    #[test]
    fn snapshot_without_context() {
        let blob = encode(State::Created, None).unwrap();
        let (state, ctx) = decode(&blob).unwrap();

        assert_eq!(state, State::Created);
        assert!(ctx.is_none());
    }

    #[test]
    fn reject_bad_version() {
        let mut blob = encode(State::Created, None).unwrap();
        blob[0] = 0x7f;

        assert_eq!(
            decode(&blob).err(),
            Some(Error::Decode(WireError::InvalidEncoding))
        );
    }

    #[test]
    fn reject_truncated() {
        let blob = encode(State::Invited, Some(&build_context())).unwrap();

        assert_eq!(
            decode(&blob[..blob.len() - 1]).err(),
            Some(Error::Decode(WireError::InvalidLength))
        );
    }

    #[test]
    fn state_tags_roundtrip() {
        use strum::IntoEnumIterator;

        for state in State::iter() {
            assert_eq!(tag_state(state_tag(state)).unwrap(), state);
        }

        // the sub-state not covered by the default iteration
        let s = State::Negotiating(Round::SignatureExchanged);
        assert_eq!(tag_state(state_tag(s)).unwrap(), s);
    }
}
