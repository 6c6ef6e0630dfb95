//! The packed storage record of an indexed transaction.
//!
//! A record holds a transaction's wire bytes together with its chain position and a
//! pre-parsed copy of its inputs and outputs, so that index lookups need not re-parse the
//! wire format. All integers are little-endian; variable-length fields carry a
//! [`CompactSize`] length prefix.
//!
//! | field        | encoding                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | schema tag   | `u8`, currently [`SCHEMA_VERSION`]                              |
//! | height       | `u32`                                                           |
//! | block time   | `i64`, seconds since the Unix epoch                             |
//! | txid         | 32 bytes, internal byte order                                   |
//! | wire bytes   | byte string                                                     |
//! | version      | `i32`                                                           |
//! | lock time    | `u32`                                                           |
//! | inputs       | count, then per input: prev txid, `u32` prev index, unlocking script, `u32` sequence |
//! | outputs      | count, then per output: `u32` n, value as a minimal big-endian byte string, locking script, address list |
//!
//! Output addresses are written for consumers that scan records without decoding them.
//! [`unpack`] never trusts them: it derives every address again from the locking script.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use coinpack_encoding::{CompactSize, Vector};
use coinpack_protocol::{
    consensus::{BlockHeight, Parameters},
    value::Amount,
    TxId,
};
use tracing::{debug, trace};

use transparent::{
    address::Script,
    bundle::{OutPoint, TxIn},
    encoding::script_addresses,
};

use super::{Error, Transaction, Vout};

/// The schema tag written at the start of every record.
pub const SCHEMA_VERSION: u8 = 1;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedRecord,
            _ => Error::MalformedTransaction(e.to_string()),
        }
    }
}

/// Packs a transaction mined at `height` in a block with timestamp `block_time`.
///
/// The output is a deterministic function of its arguments. Output addresses are derived
/// from each locking script under `params`; the addresses carried by `tx` are not used.
pub fn pack<P: Parameters>(
    tx: &Transaction,
    height: BlockHeight,
    block_time: i64,
    params: &P,
) -> Result<Vec<u8>, Error> {
    for (position, out) in tx.vout.iter().enumerate() {
        if u32::try_from(position).ok() != Some(out.n) {
            return Err(Error::EncodingError(format!(
                "output at position {} has index {}",
                position, out.n
            )));
        }
    }

    let mut buf = Vec::with_capacity(2 * tx.hex.len() + 64);
    write_record(&mut buf, tx, height, block_time, params)
        .map_err(|e| Error::EncodingError(e.to_string()))?;

    trace!(
        txid = %tx.txid,
        height = u32::from(height),
        len = buf.len(),
        "Packed transaction"
    );
    Ok(buf)
}

fn write_record<W: Write, P: Parameters>(
    mut writer: W,
    tx: &Transaction,
    height: BlockHeight,
    block_time: i64,
    params: &P,
) -> io::Result<()> {
    writer.write_u8(SCHEMA_VERSION)?;
    writer.write_u32::<LittleEndian>(height.into())?;
    writer.write_i64::<LittleEndian>(block_time)?;
    tx.txid.write(&mut writer)?;
    Vector::write_bytes(&mut writer, &tx.hex)?;
    writer.write_i32::<LittleEndian>(tx.version)?;
    writer.write_u32::<LittleEndian>(tx.lock_time)?;

    Vector::write(&mut writer, &tx.vin, |w, txin| txin.write(w))?;
    Vector::write(&mut writer, &tx.vout, |w, out| {
        w.write_u32::<LittleEndian>(out.n)?;
        Vector::write_bytes(&mut *w, &out.value.to_be_bytes())?;
        out.script_pubkey.write(&mut *w)?;
        let addresses = script_addresses(params, &out.script_pubkey.0);
        Vector::write(w, &addresses, |w, addr| Vector::write_bytes(w, addr.as_bytes()))
    })
}

/// Unpacks a record written by [`pack`], returning the transaction and its height.
///
/// Both timestamps of the returned transaction are set to the stored block time. Output
/// addresses are derived from each locking script under `params`.
pub fn unpack<P: Parameters>(buf: &[u8], params: &P) -> Result<(Transaction, BlockHeight), Error> {
    let mut reader = buf;
    let result = read_record(&mut reader, params).and_then(|unpacked| {
        if reader.is_empty() {
            Ok(unpacked)
        } else {
            Err(Error::MalformedTransaction(format!(
                "{} trailing bytes after record",
                reader.len()
            )))
        }
    });

    match &result {
        Ok((tx, height)) => trace!(
            txid = %tx.txid,
            height = u32::from(*height),
            "Unpacked transaction"
        ),
        Err(e) => debug!(len = buf.len(), "Rejecting packed record: {}", e),
    }
    result
}

fn read_record<R: Read, P: Parameters>(
    mut reader: R,
    params: &P,
) -> Result<(Transaction, BlockHeight), Error> {
    let tag = reader.read_u8()?;
    if tag != SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion(tag));
    }

    let height = BlockHeight::from_u32(reader.read_u32::<LittleEndian>()?);
    let block_time = reader.read_i64::<LittleEndian>()?;
    let txid = TxId::read(&mut reader)?;
    let hex = Vector::read_bytes(&mut reader)?;
    let version = reader.read_i32::<LittleEndian>()?;
    let lock_time = reader.read_u32::<LittleEndian>()?;

    let vin = Vector::read(&mut reader, read_input)?;

    let vout_count: usize = CompactSize::read_t(&mut reader)?;
    let mut vout = Vec::with_capacity(vout_count.min(1024));
    for position in 0..vout_count {
        vout.push(read_output(&mut reader, position, params)?);
    }

    let tx = Transaction {
        txid,
        hex,
        version,
        lock_time,
        time: block_time,
        block_time,
        vin,
        vout,
    };
    Ok((tx, height))
}

fn read_input<R: Read>(reader: &mut R) -> io::Result<TxIn> {
    let prevout = OutPoint::read(&mut *reader)?;
    let script_sig = Script::read(&mut *reader)?;
    let sequence = reader.read_u32::<LittleEndian>()?;
    Ok(TxIn::from_parts(prevout, script_sig, sequence))
}

fn read_output<R: Read, P: Parameters>(
    mut reader: R,
    position: usize,
    params: &P,
) -> Result<Vout, Error> {
    let n = reader.read_u32::<LittleEndian>()?;
    if u32::try_from(position).ok() != Some(n) {
        return Err(Error::MalformedTransaction(format!(
            "output at position {} has index {}",
            position, n
        )));
    }

    let value = Amount::from_be_bytes(&Vector::read_bytes(&mut reader)?)
        .map_err(|e| Error::MalformedTransaction(e.to_string()))?;
    let script_pubkey = Script::read(&mut reader)?;

    // Stored addresses are validated and then replaced by freshly derived ones.
    let stored: Vec<Vec<u8>> = Vector::read(&mut reader, |r| Vector::read_bytes(r))?;
    for addr in stored {
        String::from_utf8(addr).map_err(|e| Error::MalformedTransaction(e.to_string()))?;
    }
    let addresses = script_addresses(params, &script_pubkey.0);

    Ok(Vout {
        n,
        value,
        script_pubkey,
        addresses,
    })
}
