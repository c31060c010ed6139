use std::ffi::{c_char, CStr, CString};
use std::path::Path;

use fitsio::errors::check_status;
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use ndarray::{Array2, Array3, Axis};
use tracing::debug;

use crate::consts::TRIMSEC_KEY;
use crate::error::{OptredError, Result};
use crate::frame::Frame;
use crate::header::{Header, HeaderValue};
use crate::io::layout::join_split_amplifiers;
use crate::io::trim::TrimSection;
use crate::telescope::{PlaneLayout, Telescope};

/// FLEN_CARD: 80 characters plus the terminating NUL.
const CARD_BUFFER_LEN: usize = 81;

/// Significant digits for floating point keyword values (negative selects %G).
const FLOAT_KEY_DECIMALS: i32 = -17;

fn open(path: &Path) -> Result<FitsFile> {
    if !path.is_file() {
        return Err(OptredError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    Ok(FitsFile::open(path)?)
}

/// Read the non-structural header of HDU `hdu_index` (0 = primary).
pub fn read_header(path: &Path, hdu_index: usize) -> Result<Header> {
    let mut fptr = open(path)?;
    let hdu = fptr.hdu(hdu_index)?;
    read_hdu_header(&mut fptr, &hdu)
}

fn read_hdu_header(fptr: &mut FitsFile, hdu: &FitsHdu) -> Result<Header> {
    // Make sure the raw calls below act on this HDU.
    fptr.hdu(hdu.number)?;

    let mut status = 0;
    let mut nexist = 0;
    let mut nmore = 0;
    unsafe {
        // ffghsp = fits_get_hdrspace
        fitsio_sys::ffghsp(
            fptr.as_raw(), /* I - FITS file pointer                     */
            &mut nexist,   /* O - number of existing keywords in header */
            &mut nmore,    /* O - how many more keywords will fit       */
            &mut status,   /* IO - error status                         */
        );
    }
    check_status(status)?;

    let mut cards = Vec::with_capacity(nexist.max(0) as usize);
    let mut buf = [0 as c_char; CARD_BUFFER_LEN];
    for keynum in 1..=nexist {
        unsafe {
            // ffgrec = fits_read_record
            fitsio_sys::ffgrec(
                fptr.as_raw(),     /* I - FITS file pointer            */
                keynum,            /* I - number of the keyword to read */
                buf.as_mut_ptr(),  /* O - keyword card                  */
                &mut status,       /* IO - error status                 */
            );
        }
        check_status(status)?;
        let card = unsafe { CStr::from_ptr(buf.as_ptr()) };
        cards.push(card.to_string_lossy().into_owned());
    }

    Header::from_cards(cards)
}

/// Shape of an image HDU, in row-major order. Empty for data-less HDUs.
fn image_shape(hdu: &FitsHdu) -> Option<&[usize]> {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Some(shape.as_slice()),
        _ => None,
    }
}

fn read_plane(fptr: &mut FitsFile, hdu: &FitsHdu, path: &Path) -> Result<Array2<f32>> {
    let (h, w) = match image_shape(hdu) {
        Some([h, w]) => (*h, *w),
        _ => {
            return Err(OptredError::NotAnImage {
                path: path.to_path_buf(),
                hdu: hdu.number,
            })
        }
    };
    let pixels: Vec<f32> = hdu.read_image(fptr)?;
    Ok(Array2::from_shape_vec((h, w), pixels)?)
}

/// Every extension HDU that holds a 2D image.
fn image_extensions(fptr: &mut FitsFile) -> Vec<FitsHdu> {
    fptr.iter()
        .filter(|hdu| hdu.number > 0 && matches!(image_shape(hdu), Some([_, _])))
        .collect()
}

/// Read a frame, assembling its planes according to the telescope layout.
///
/// The frame header is always the primary header. Multi-extension frames
/// also keep each extension's own header beside its plane.
pub fn read_frame(path: &Path, telescope: Telescope) -> Result<Frame> {
    let mut fptr = open(path)?;
    let primary = fptr.primary_hdu()?;
    let header = read_hdu_header(&mut fptr, &primary)?;

    let (data, plane_headers) = match telescope.layout() {
        PlaneLayout::Primary => (read_primary_planes(&mut fptr, &primary, path)?, Vec::new()),
        PlaneLayout::SplitAmplifiers => {
            let exts = image_extensions(&mut fptr);
            if exts.len() < 2 {
                return Err(OptredError::MissingExtensions {
                    path: path.to_path_buf(),
                    expected: 2,
                    found: exts.len(),
                });
            }
            let first = read_trimmed(&mut fptr, &exts[0], path)?;
            let second = read_trimmed(&mut fptr, &exts[1], path)?;
            let joined = join_split_amplifiers(first, second)?.insert_axis(Axis(0));
            (joined, Vec::new())
        }
        PlaneLayout::MultiExtension => {
            let exts = image_extensions(&mut fptr);
            if exts.is_empty() {
                return Err(OptredError::MissingExtensions {
                    path: path.to_path_buf(),
                    expected: 1,
                    found: 0,
                });
            }
            read_extension_planes(&mut fptr, &exts, path)?
        }
    };

    debug!(
        path = %path.display(),
        telescope = %telescope,
        shape = ?data.dim(),
        "Loaded frame"
    );
    Ok(Frame::new(data, header)
        .with_plane_headers(plane_headers)
        .with_source(path))
}

/// Read a frame written by [`write_frame`]: pixels in the primary HDU, or an
/// empty primary followed by one image extension per plane.
///
/// Masters are stored already assembled, so no telescope layout applies.
pub fn read_master(path: &Path) -> Result<Frame> {
    let mut fptr = open(path)?;
    let primary = fptr.primary_hdu()?;
    let header = read_hdu_header(&mut fptr, &primary)?;

    let (data, plane_headers) = match image_shape(&primary) {
        Some([_, _]) | Some([_, _, _]) => {
            (read_primary_planes(&mut fptr, &primary, path)?, Vec::new())
        }
        _ => {
            let exts = image_extensions(&mut fptr);
            if exts.is_empty() {
                return Err(OptredError::NotAnImage {
                    path: path.to_path_buf(),
                    hdu: 0,
                });
            }
            read_extension_planes(&mut fptr, &exts, path)?
        }
    };
    debug!(path = %path.display(), shape = ?data.dim(), "Loaded master");
    Ok(Frame::new(data, header)
        .with_plane_headers(plane_headers)
        .with_source(path))
}

/// One plane per image extension, each with its own header.
fn read_extension_planes(
    fptr: &mut FitsFile,
    exts: &[FitsHdu],
    path: &Path,
) -> Result<(Array3<f32>, Vec<Header>)> {
    let mut planes = Vec::with_capacity(exts.len());
    let mut headers = Vec::with_capacity(exts.len());
    for hdu in exts {
        headers.push(read_hdu_header(fptr, hdu)?);
        planes.push(read_plane(fptr, hdu, path)?);
    }
    Ok((stack_planes(&planes)?, headers))
}

fn read_primary_planes(fptr: &mut FitsFile, primary: &FitsHdu, path: &Path) -> Result<Array3<f32>> {
    match image_shape(primary) {
        Some([_, _]) => Ok(read_plane(fptr, primary, path)?.insert_axis(Axis(0))),
        Some([p, h, w]) => {
            let (p, h, w) = (*p, *h, *w);
            let pixels: Vec<f32> = primary.read_image(fptr)?;
            Ok(Array3::from_shape_vec((p, h, w), pixels)?)
        }
        _ => Err(OptredError::NotAnImage {
            path: path.to_path_buf(),
            hdu: 0,
        }),
    }
}

fn read_trimmed(fptr: &mut FitsFile, hdu: &FitsHdu, path: &Path) -> Result<Array2<f32>> {
    let header = read_hdu_header(fptr, hdu)?;
    let plane = read_plane(fptr, hdu, path)?;
    let section: TrimSection = header
        .get_text(TRIMSEC_KEY)
        .ok_or_else(|| OptredError::MissingKeyword {
            path: path.to_path_buf(),
            key: format!("{TRIMSEC_KEY} (HDU {})", hdu.number),
        })?
        .parse()?;
    section.apply(plane.view())
}

fn stack_planes(planes: &[Array2<f32>]) -> Result<Array3<f32>> {
    let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
    Ok(ndarray::stack(Axis(0), &views)?)
}

/// Write a frame as 32-bit float FITS. The target must not exist.
///
/// A single plane goes into the primary HDU. Several planes are written as
/// an empty primary HDU carrying the header followed by one `IMn` image
/// extension per plane, each carrying that plane's header if the frame has
/// one.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<()> {
    let (planes, h, w) = frame.shape();
    let dimensions = [h, w];
    let description = ImageDescription {
        data_type: ImageType::Float,
        dimensions: &dimensions,
    };

    if frame.is_single_plane() {
        let mut fptr = FitsFile::create(path)
            .with_custom_primary(&description)
            .open()?;
        let hdu = fptr.primary_hdu()?;
        let pixels: Vec<f32> = frame.plane(0).iter().copied().collect();
        hdu.write_image(&mut fptr, &pixels)?;
        write_header(&mut fptr, &hdu, &frame.header)?;
    } else {
        let mut fptr = FitsFile::create(path).open()?;
        let primary = fptr.primary_hdu()?;
        write_header(&mut fptr, &primary, &frame.header)?;
        for i in 0..planes {
            let hdu = fptr.create_image(format!("IM{}", i + 1), &description)?;
            let pixels: Vec<f32> = frame.plane(i).iter().copied().collect();
            hdu.write_image(&mut fptr, &pixels)?;
            if let Some(plane_header) = frame.plane_header(i) {
                write_header(&mut fptr, &hdu, plane_header)?;
            }
        }
    }

    debug!(path = %path.display(), shape = ?frame.shape(), "Wrote frame");
    Ok(())
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| OptredError::InvalidCard(s.to_string()))
}

fn write_header(fptr: &mut FitsFile, hdu: &FitsHdu, header: &Header) -> Result<()> {
    fptr.hdu(hdu.number)?;
    let mut status = 0;

    for kw in header.keywords() {
        let name = c_string(&kw.name)?;
        let comment = kw.comment.as_deref().map(c_string).transpose()?;
        let comment_ptr = comment
            .as_ref()
            .map_or(std::ptr::null(), |c| c.as_ptr());

        match &kw.value {
            HeaderValue::Text(s) => {
                let value = c_string(s)?;
                unsafe {
                    // ffpkls = fits_write_key_longstr
                    fitsio_sys::ffpkls(
                        fptr.as_raw(),
                        name.as_ptr(),
                        value.as_ptr(),
                        comment_ptr,
                        &mut status,
                    );
                }
            }
            HeaderValue::Integer(i) => unsafe {
                // ffpkyj = fits_write_key_lng
                fitsio_sys::ffpkyj(fptr.as_raw(), name.as_ptr(), *i, comment_ptr, &mut status);
            },
            HeaderValue::Float(f) => unsafe {
                // ffpkyd = fits_write_key_dbl
                fitsio_sys::ffpkyd(
                    fptr.as_raw(),
                    name.as_ptr(),
                    *f,
                    FLOAT_KEY_DECIMALS,
                    comment_ptr,
                    &mut status,
                );
            },
            HeaderValue::Logical(b) => unsafe {
                // ffpkyl = fits_write_key_log
                fitsio_sys::ffpkyl(
                    fptr.as_raw(),
                    name.as_ptr(),
                    i32::from(*b),
                    comment_ptr,
                    &mut status,
                );
            },
        }
        check_status(status)?;
    }

    for line in header.history() {
        let line = c_string(line)?;
        unsafe {
            // ffphis = fits_write_history
            fitsio_sys::ffphis(fptr.as_raw(), line.as_ptr(), &mut status);
        }
        check_status(status)?;
    }
    for line in header.comments() {
        let line = c_string(line)?;
        unsafe {
            // ffpcom = fits_write_comment
            fitsio_sys::ffpcom(fptr.as_raw(), line.as_ptr(), &mut status);
        }
        check_status(status)?;
    }
    Ok(())
}
